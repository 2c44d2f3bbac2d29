//! Width-generic pseudocode helpers shared by every eval routine.
//!
//! Ported line-for-line from `helpers.py`'s `AddWithCarry`/`*_C` shift family
//! and `ThumbExpandImm_C`, generalized from the teacher's `i32`-specific
//! barrel shifter (`arm7tdmi/exec/mod.rs`) to arbitrary-width [`Bitstring`]s.

use crate::bitstring::Bitstring;

/// The kind of shift/rotate a shifted-register operand applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftType {
    /// Logical shift left.
    Lsl,
    /// Logical shift right.
    Lsr,
    /// Arithmetic shift right.
    Asr,
    /// Rotate right.
    Ror,
    /// Rotate right with extend (through the carry flag).
    Rrx,
}

/// Adds `x + y + carry_in`, returning the width-truncated result plus the
/// carry-out and overflow flags.
pub fn add_with_carry(x: Bitstring, y: Bitstring, carry_in: bool) -> (Bitstring, bool, bool) {
    assert_eq!(x.width(), y.width());
    let width = x.width();
    let carry = if carry_in { 1u128 } else { 0 };
    let unsigned_sum = x.unsigned() + y.unsigned() + carry;
    let signed_sum = x.signed() as i128 + y.signed() as i128 + carry as i128;
    let result = Bitstring::new(unsigned_sum, width);
    let carry_out = result.unsigned() != unsigned_sum;
    let overflow = result.signed() as i128 != signed_sum;
    (result, carry_out, overflow)
}

/// Logical shift left by `shift > 0` bits, with carry-out.
pub fn lsl_c(x: Bitstring, shift: u32) -> (Bitstring, bool) {
    assert!(shift > 0);
    let extended = x.zero_extend(x.width() + shift) << shift;
    let result = extended.slice(0, x.width());
    let carry_out = extended.bit(x.width() as i32).unsigned() == 1;
    (result, carry_out)
}

/// Logical shift left by `shift >= 0` bits (no carry reported).
pub fn lsl(x: Bitstring, shift: u32) -> Bitstring {
    if shift == 0 {
        x
    } else {
        lsl_c(x, shift).0
    }
}

/// Logical shift right by `shift > 0` bits, with carry-out.
pub fn lsr_c(x: Bitstring, shift: u32) -> (Bitstring, bool) {
    assert!(shift > 0);
    let extended = x.zero_extend(shift + x.width());
    let result = extended.slice(shift, shift + x.width());
    let carry_out = extended.bit((shift - 1) as i32).unsigned() == 1;
    (result, carry_out)
}

/// Logical shift right by `shift >= 0` bits.
pub fn lsr(x: Bitstring, shift: u32) -> Bitstring {
    if shift == 0 {
        x
    } else {
        lsr_c(x, shift).0
    }
}

/// Arithmetic shift right by `shift > 0` bits, with carry-out.
pub fn asr_c(x: Bitstring, shift: u32) -> (Bitstring, bool) {
    assert!(shift > 0);
    let extended = x.sign_extend(shift + x.width());
    let result = extended.slice(shift, shift + x.width());
    let carry_out = extended.bit((shift - 1) as i32).unsigned() == 1;
    (result, carry_out)
}

/// Arithmetic shift right by `shift >= 0` bits.
pub fn asr(x: Bitstring, shift: u32) -> Bitstring {
    if shift == 0 {
        x
    } else {
        asr_c(x, shift).0
    }
}

/// Rotate right by a nonzero `shift`, with carry-out.
pub fn ror_c(x: Bitstring, shift: u32) -> (Bitstring, bool) {
    assert!(shift != 0);
    let m = shift % x.width();
    if m == 0 {
        let carry_out = x.bit((x.width() - 1) as i32).unsigned() == 1;
        return (x, carry_out);
    }
    let result = lsr(x, m) | lsl(x, x.width() - m);
    let carry_out = result.bit((x.width() - 1) as i32).unsigned() == 1;
    (result, carry_out)
}

/// Rotate right by `shift >= 0`.
pub fn ror(x: Bitstring, shift: u32) -> Bitstring {
    if shift == 0 {
        x
    } else {
        ror_c(x, shift).0
    }
}

/// Rotate right through carry by exactly one bit.
pub fn rrx_c(x: Bitstring, carry_in: bool) -> (Bitstring, bool) {
    let carry_bit = Bitstring::new(if carry_in { 1 } else { 0 }, 1);
    let result = carry_bit.concat(&x.slice(1, x.width()));
    let carry_out = x.bit(0).unsigned() == 1;
    (result, carry_out)
}

/// Rotate right through carry by exactly one bit (carry-out discarded).
pub fn rrx(x: Bitstring, carry_in: bool) -> Bitstring {
    rrx_c(x, carry_in).0
}

/// Dispatches to the appropriate `*_C` helper, passing `amount == 0` through
/// unchanged. Panics if `type == Rrx` and `amount != 1` (architecturally
/// guaranteed by `decode_imm_shift`, never true for a shifted-register
/// operand).
pub fn shift_c(value: Bitstring, kind: ShiftType, amount: u32, carry_in: bool) -> (Bitstring, bool) {
    assert!(!(kind == ShiftType::Rrx && amount != 1));
    if amount == 0 {
        return (value, carry_in);
    }
    match kind {
        ShiftType::Lsl => lsl_c(value, amount),
        ShiftType::Lsr => lsr_c(value, amount),
        ShiftType::Asr => asr_c(value, amount),
        ShiftType::Ror => ror_c(value, amount),
        ShiftType::Rrx => rrx_c(value, carry_in),
    }
}

/// As [`shift_c`] but discards the carry-out.
pub fn shift(value: Bitstring, kind: ShiftType, amount: u32, carry_in: bool) -> Bitstring {
    shift_c(value, kind, amount, carry_in).0
}

/// Decodes a 2-bit `type` field plus a 5-bit `imm5` into a shift kind and
/// normalized shift amount (`LSR #0`/`ASR #0` mean shift-by-32; an all-zero
/// `ROR` means `RRX #1`).
pub fn decode_imm_shift(kind: u32, imm5: Bitstring) -> (ShiftType, u32) {
    match kind {
        0b00 => (ShiftType::Lsl, imm5.unsigned() as u32),
        0b01 => (ShiftType::Lsr, if imm5.is_zero() { 32 } else { imm5.unsigned() as u32 }),
        0b10 => (ShiftType::Asr, if imm5.is_zero() { 32 } else { imm5.unsigned() as u32 }),
        0b11 => {
            if imm5.is_zero() {
                (ShiftType::Rrx, 1)
            } else {
                (ShiftType::Ror, imm5.unsigned() as u32)
            }
        }
        _ => unreachable!("2-bit field out of range"),
    }
}

/// Expands a 12-bit Thumb-2 modified-immediate field into a 32-bit value,
/// with carry-out (used by `ADC`/`SBC`/... wide immediate forms that affect
/// the carry flag).
pub fn thumb_expand_imm_c(imm12: Bitstring, carry_in: bool) -> (Bitstring, bool) {
    assert_eq!(imm12.width(), 12);
    let top2 = imm12.slice(10, 12);
    if top2.is_zero() {
        let imm12_8 = imm12.slice(8, 10);
        let imm12_0 = imm12.slice(0, 8);
        let imm32 = match imm12_8.unsigned() {
            0b00 => imm12_0.zero_extend(32),
            0b01 => Bitstring::new(0, 8).concat(&imm12_0).concat(&Bitstring::new(0, 8)).concat(&imm12_0),
            0b10 => imm12_0.concat(&Bitstring::new(0, 8)).concat(&imm12_0).concat(&Bitstring::new(0, 8)),
            0b11 => imm12_0.concat(&imm12_0).concat(&imm12_0).concat(&imm12_0),
            _ => unreachable!(),
        };
        (imm32, carry_in)
    } else {
        let unrotated = Bitstring::ONE_BIT.concat(&imm12.slice(0, 7)).zero_extend(32);
        ror_c(unrotated, imm12.slice(7, 12).unsigned() as u32)
    }
}

/// As [`thumb_expand_imm_c`] but discards the carry-out.
pub fn thumb_expand_imm(imm12: Bitstring) -> Bitstring {
    thumb_expand_imm_c(imm12, false).0
}

/// Rounds `address` down to a multiple of `alignment` (a power of two).
pub fn align(address: u32, alignment: u32) -> u32 {
    address & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_with_carry_reports_overflow() {
        let x = Bitstring::new(0x7FFFFFFF, 32);
        let y = Bitstring::new(1, 32);
        let (result, carry, overflow) = add_with_carry(x, y, false);
        assert_eq!(result.unsigned(), 0x80000000);
        assert!(!carry);
        assert!(overflow);
    }

    #[test]
    fn add_with_carry_reports_carry_out() {
        let x = Bitstring::new(0xFFFFFFFF, 32);
        let y = Bitstring::new(1, 32);
        let (result, carry, overflow) = add_with_carry(x, y, false);
        assert_eq!(result.unsigned(), 0);
        assert!(carry);
        assert!(!overflow);
    }

    #[test]
    fn lsl_c_reports_shifted_out_bit() {
        let x = Bitstring::new(0x80000000, 32);
        let (result, carry) = lsl_c(x, 1);
        assert_eq!(result.unsigned(), 0);
        assert!(carry);
    }

    #[test]
    fn ror_c_wraps_around() {
        let x = Bitstring::new(0x1, 32);
        let (result, carry) = ror_c(x, 1);
        assert_eq!(result.unsigned(), 0x80000000);
        assert!(carry);
    }

    #[test]
    fn decode_imm_shift_lsr_zero_means_32() {
        let (kind, amount) = decode_imm_shift(0b01, Bitstring::new(0, 5));
        assert_eq!(kind, ShiftType::Lsr);
        assert_eq!(amount, 32);
    }

    #[test]
    fn decode_imm_shift_ror_zero_means_rrx() {
        let (kind, amount) = decode_imm_shift(0b11, Bitstring::new(0, 5));
        assert_eq!(kind, ShiftType::Rrx);
        assert_eq!(amount, 1);
    }

    #[test]
    fn thumb_expand_imm_replicated_byte() {
        // imm12 = 0b00_11_00000001 -> 8-bit replication across all 4 bytes
        let imm12 = Bitstring::from_binary_str("001100000001");
        let imm32 = thumb_expand_imm(imm12);
        assert_eq!(imm32.unsigned(), 0x01010101);
    }

    #[test]
    fn thumb_expand_imm_rotated() {
        // bit 10 set selects the rotate-of-(1<<7 | imm7) form; rotate amount
        // (bits [7:12)) comes out to 8, rotating 0x80 right by 8 wraps its
        // set bit from position 7 to position 31.
        let imm12 = Bitstring::from_binary_str("010000000000");
        let imm32 = thumb_expand_imm(imm12);
        assert_eq!(imm32.unsigned(), 0x80000000);
    }
}
