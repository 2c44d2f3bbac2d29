//! Shared helpers used by every instruction family's decode/operand-build
//! step: pulling registers and immediates out of extracted fields, and
//! building the common operand shapes.

use std::collections::HashMap;

use crate::bitstring::Bitstring;
use crate::operand::{ImmediateOperand, RegListOperand, RegisterOperand};
use crate::operand::Operand;

/// Reads a named field as a plain `u32`, panicking (a handler-authoring
/// bug, not a runtime condition) if it's missing.
pub fn field_u32(fields: &HashMap<String, Bitstring>, name: &str) -> u32 {
    fields.get(name).unwrap_or_else(|| panic!("missing field {name:?}")).unsigned() as u32
}

/// As [`field_u32`] but returns `0` if the field wasn't extracted (used for
/// fields only present in some sibling encodings sharing one builder).
pub fn field_u32_or(fields: &HashMap<String, Bitstring>, name: &str, default: u32) -> u32 {
    fields.get(name).map(|b| b.unsigned() as u32).unwrap_or(default)
}

/// A plain, non-writeback register operand.
pub fn reg(index: u32) -> Operand {
    Operand::Register(RegisterOperand { reg: index, writeback: false })
}

/// A register operand with writeback (`Rn!`).
pub fn reg_wb(index: u32) -> Operand {
    Operand::Register(RegisterOperand { reg: index, writeback: true })
}

/// A plain immediate operand.
pub fn imm(value: i64) -> Operand {
    Operand::Immediate(ImmediateOperand { value })
}

/// Builds a register-list operand from an 8- or 16-bit bitmask (bit N set
/// means register N is in the list), ascending order.
pub fn reglist_from_mask(mask: u32, nbits: u32) -> Operand {
    let registers = (0..nbits).filter(|b| (mask >> b) & 1 == 1).collect();
    Operand::RegList(RegListOperand { registers })
}

/// Sign-extends a `width`-bit field (given as a raw value) to `i32`.
pub fn sign_extend_i32(value: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((value << shift) as i32) >> shift
}

/// True if `STM`'s base register `rn` is in `mask` at any position other
/// than the lowest set bit: architecturally UNPREDICTABLE, since the
/// written-back value of `Rn` would depend on whether it was stored
/// before or after the writeback takes effect.
pub fn stm_base_in_non_lowest_position(mask: u32, rn: u32) -> bool {
    (mask >> rn) & 1 == 1 && mask.trailing_zeros() != rn
}
