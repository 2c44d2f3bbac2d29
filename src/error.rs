//! Error types surfaced by decoding and execution.
//!
//! Mirrors the three-way split in the decoder/eval design: a decode leaf
//! that simply doesn't match falls back to the next candidate and never
//! surfaces as an error; a byte stream that runs out mid-instruction or an
//! encoding nothing in the tree recognizes surfaces as [`CmthumbError::Undefined`];
//! and an architecturally UNPREDICTABLE encoding or runtime state surfaces as
//! [`CmthumbError::Unpredictable`], left to the caller to decide how to handle.

use thiserror::Error;

/// Failures that can occur while decoding or executing an instruction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CmthumbError {
    /// No decoder-tree leaf recognized the encoding.
    #[error("undefined instruction {0:#010x}")]
    Undefined(u32),

    /// The encoding decoded but the architecture defines its behavior as
    /// UNPREDICTABLE (e.g. a reserved condition code, a write to PC from an
    /// instruction that doesn't allow it, an overlapping register list).
    #[error("unpredictable encoding: {0}")]
    Unpredictable(String),
}

/// Internal signal used only inside the decoder tree: "this leaf's fixed
/// bits didn't match, try the next candidate". Never escapes
/// [`crate::decoder::Decoder::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DecodeError;

/// Convenience alias for fallible decode/execute operations.
pub type Result<T> = std::result::Result<T, CmthumbError>;
