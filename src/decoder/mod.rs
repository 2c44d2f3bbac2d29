//! Builds the decoder tree once and exposes instruction- and
//! stream-oriented decoding on top of it.
//!
//! Classification of narrow (16-bit) vs. wide (32-bit) Thumb-2 encodings
//! follows the architectural rule: a 32-bit instruction's first halfword
//! has its top 5 bits in `{0b11101, 0b11110, 0b11111}`, i.e.
//! `first & 0xF800 ∈ {0xE800, 0xF000, 0xF800}`. Everything else is a
//! 16-bit Thumb-1 encoding.

pub mod tree;

use std::collections::HashMap;
use std::sync::OnceLock;

use byteorder::{ByteOrder, LittleEndian};
use log::warn;

use crate::bitstring::Bitstring;
use crate::error::CmthumbError;
use crate::handlers;
use crate::instruction::{EvalFn, Instruction};
use crate::operand::Operand;
use crate::specparse::{parse_spec, spec_width, SpecField};
use tree::{build, lookup, Candidate, Node};

/// One registered encoding: its mnemonic, fixed-bit constraint, named-field
/// bit ranges within the combined raw value, operand builder, and eval
/// routine.
pub struct LeafDef {
    /// Base mnemonic (without a condition suffix).
    pub mnemonic: &'static str,
    /// True for a 32-bit (Thumb-2 wide) encoding.
    pub is_wide: bool,
    /// Bits significant to matching this encoding.
    pub mask: u32,
    /// The fixed bits' required values.
    pub match_bits: u32,
    /// `(field name, lo, hi)` bit ranges within the combined raw value.
    pub field_ranges: Vec<(String, u32, u32)>,
    /// Builds the operand list for display, given the extracted fields.
    pub build_operands: fn(&HashMap<String, Bitstring>) -> Vec<Operand>,
    /// Executes the instruction against CPU + memory.
    pub eval: EvalFn,
}

impl LeafDef {
    /// Compiles `spec` (a single 16-bit half-spec) and fills in this leaf's
    /// mask/match/field-ranges. Used by handler modules building narrow
    /// encodings.
    pub(crate) fn with_spec(mut self, spec: &str) -> LeafDef {
        let (mask, match_bits, ranges) = compile_half(spec);
        self.mask = mask;
        self.match_bits = match_bits;
        self.field_ranges = ranges;
        self
    }

    /// As [`LeafDef::with_spec`], for a wide (32-bit) encoding given as two
    /// 16-bit half-specs.
    pub(crate) fn with_wide_spec(mut self, hi: &str, lo: &str) -> LeafDef {
        let (mask, match_bits, ranges) = compile_leaf(&[hi, lo]);
        self.mask = mask;
        self.match_bits = match_bits;
        self.field_ranges = ranges;
        self
    }
}

/// Compiles one 16-bit half-spec into its `(mask, match_bits, field ranges)`,
/// assigning bit positions MSB-first as written, LSB-indexed (bit 0 is the
/// least significant bit of this half).
pub(crate) fn compile_half(spec: &str) -> (u32, u32, Vec<(String, u32, u32)>) {
    let fields = parse_spec(spec);
    let width = spec_width(&fields);
    assert_eq!(width, 16, "half-spec {spec:?} does not cover 16 bits");

    let mut mask = 0u32;
    let mut match_bits = 0u32;
    let mut ranges = Vec::new();
    let mut cursor = width;

    for field in fields {
        match field {
            SpecField::Bit(b) => {
                cursor -= 1;
                mask |= 1 << cursor;
                if b == 1 {
                    match_bits |= 1 << cursor;
                }
            }
            SpecField::Named(name, w) => {
                cursor -= w;
                ranges.push((name, cursor, cursor + w));
            }
        }
    }

    (mask, match_bits, ranges)
}

/// Compiles a leaf's spec string(s) into a full `Candidate` plus its field
/// ranges. A narrow leaf takes one 16-bit spec; a wide leaf takes two,
/// the first occupying the combined raw's high halfword (`[31:16]`), the
/// second its low halfword (`[15:0]`).
pub(crate) fn compile_leaf(specs: &[&str]) -> (u32, u32, Vec<(String, u32, u32)>) {
    match specs {
        [narrow] => compile_half(narrow),
        [hi, lo] => {
            let (hi_mask, hi_match, hi_ranges) = compile_half(hi);
            let (lo_mask, lo_match, lo_ranges) = compile_half(lo);
            let mask = (hi_mask << 16) | lo_mask;
            let match_bits = (hi_match << 16) | lo_match;
            let mut ranges: Vec<(String, u32, u32)> =
                hi_ranges.into_iter().map(|(n, l, h)| (n, l + 16, h + 16)).collect();
            ranges.extend(lo_ranges);
            (mask, match_bits, ranges)
        }
        _ => panic!("compile_leaf: expected 1 or 2 spec strings"),
    }
}

/// The full decoder registry: every leaf plus the two top-level trees
/// (narrow and wide) built over them.
struct Registry {
    leaves: Vec<LeafDef>,
    narrow_tree: Node,
    wide_tree: Node,
}

fn build_registry() -> Registry {
    let leaves = handlers::all_leaves();
    let mut narrow_candidates = Vec::new();
    let mut wide_candidates = Vec::new();
    for (i, leaf) in leaves.iter().enumerate() {
        let candidate = Candidate { mask: leaf.mask, match_bits: leaf.match_bits, payload: i };
        if leaf.is_wide {
            wide_candidates.push(candidate);
        } else {
            narrow_candidates.push(candidate);
        }
    }
    Registry {
        narrow_tree: build(narrow_candidates),
        wide_tree: build(wide_candidates),
        leaves,
    }
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

/// True if the first halfword of an instruction indicates a 32-bit Thumb-2
/// wide encoding.
pub fn is_wide_prefix(first_halfword: u16) -> bool {
    matches!(first_halfword & 0xF800, 0xE800 | 0xF000 | 0xF800)
}

/// Extracts every named field's value out of `raw` according to a leaf's
/// compiled field ranges.
fn extract_fields(leaf: &LeafDef, raw: u32, total_width: u32) -> HashMap<String, Bitstring> {
    let whole = Bitstring::new(raw as u128, total_width);
    leaf.field_ranges.iter().map(|(name, lo, hi)| (name.clone(), whole.slice(*lo, *hi))).collect()
}

/// Decodes one already-combined instruction word (16 or 32 bits) at
/// `address`.
pub fn decode_one(raw: u32, address: u32, is_wide: bool) -> Result<Instruction, CmthumbError> {
    let reg = registry();
    let tree = if is_wide { &reg.wide_tree } else { &reg.narrow_tree };
    let Ok(payload) = lookup(tree, raw) else {
        warn!("undefined {}-bit instruction {:#010x} at {:#010x}", if is_wide { 32 } else { 16 }, raw, address);
        return Err(CmthumbError::Undefined(raw));
    };
    let leaf = &reg.leaves[payload];
    let total_width = if is_wide { 32 } else { 16 };
    let fields = extract_fields(leaf, raw, total_width);
    let operands = (leaf.build_operands)(&fields);
    Ok(Instruction {
        mnemonic: leaf.mnemonic,
        address,
        raw,
        is_wide,
        fields,
        operands,
        eval: leaf.eval,
    })
}

/// Streams instructions out of a byte buffer, starting at `base_address`.
///
/// A too-short trailing halfword (an odd byte left over) simply ends the
/// stream. A wide-encoding prefix halfword with no second halfword
/// available also ends the stream silently (matching the original's
/// `disasm` generator, which only suppresses `UndefinedInstruction` in
/// exactly this case); any other undefined encoding is surfaced as an
/// `Err` item without stopping iteration, so callers can skip over data
/// bytes embedded in a code stream.
pub struct Disassembler<'a> {
    bytes: &'a [u8],
    offset: usize,
    address: u32,
}

impl<'a> Disassembler<'a> {
    /// Builds a disassembler over `bytes`, with the first byte at
    /// `base_address`.
    pub fn new(bytes: &'a [u8], base_address: u32) -> Disassembler<'a> {
        Disassembler { bytes, offset: 0, address: base_address }
    }
}

impl<'a> Iterator for Disassembler<'a> {
    type Item = Result<Instruction, CmthumbError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset + 2 > self.bytes.len() {
            return None;
        }
        let first = LittleEndian::read_u16(&self.bytes[self.offset..]);
        let address = self.address;

        if is_wide_prefix(first) {
            if self.offset + 4 > self.bytes.len() {
                return None;
            }
            let second = LittleEndian::read_u16(&self.bytes[self.offset + 2..]);
            let raw = ((first as u32) << 16) | second as u32;
            self.offset += 4;
            self.address = self.address.wrapping_add(4);
            Some(decode_one(raw, address, true))
        } else {
            self.offset += 2;
            self.address = self.address.wrapping_add(2);
            Some(decode_one(first as u32, address, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_prefix_classification() {
        assert!(is_wide_prefix(0xF000));
        assert!(is_wide_prefix(0xE800));
        assert!(is_wide_prefix(0xF800));
        assert!(!is_wide_prefix(0x4800));
        assert!(!is_wide_prefix(0xE000));
    }

    #[test]
    fn odd_trailing_byte_ends_stream_quietly() {
        let bytes = [0x00u8];
        let mut d = Disassembler::new(&bytes, 0);
        assert!(d.next().is_none());
    }

    #[test]
    fn truncated_wide_prefix_ends_stream_quietly() {
        // 0xF000 lsb-first bytes, with nothing following.
        let bytes = [0x00u8, 0xF0u8];
        let mut d = Disassembler::new(&bytes, 0);
        assert!(d.next().is_none());
    }

    #[test]
    fn compile_half_extracts_named_ranges() {
        let (mask, match_bits, ranges) = compile_half("000110 Rn(3) Rd(3) 1111");
        assert_eq!(mask & 0xF, 0xF);
        assert_eq!(match_bits & 0xF, 0xF);
        assert!(ranges.iter().any(|(n, _, _)| n == "Rn"));
        assert!(ranges.iter().any(|(n, _, _)| n == "Rd"));
    }

    #[test]
    fn nop_decodes() {
        // NOP T1: 1011 1111 0000 0000
        let instr = decode_one(0b1011111100000000, 0, false).unwrap();
        assert_eq!(instr.mnemonic, "NOP");
    }
}
