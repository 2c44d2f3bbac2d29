//! The 4-bit condition field and its predicate table.

use crate::bitstring::Bitstring;
use crate::error::CmthumbError;

/// One of the sixteen ARM condition codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Equal (Z set).
    Eq,
    /// Not equal (Z clear).
    Ne,
    /// Carry set / unsigned higher or same.
    Cs,
    /// Carry clear / unsigned lower.
    Cc,
    /// Minus / negative (N set).
    Mi,
    /// Plus / positive or zero (N clear).
    Pl,
    /// Overflow (V set).
    Vs,
    /// No overflow (V clear).
    Vc,
    /// Unsigned higher.
    Hi,
    /// Unsigned lower or same.
    Ls,
    /// Signed greater than or equal.
    Ge,
    /// Signed less than.
    Lt,
    /// Signed greater than.
    Gt,
    /// Signed less than or equal.
    Le,
    /// Always.
    Al,
}

/// The processor flags `Condition::check` reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    /// Negative flag.
    pub n: bool,
    /// Zero flag.
    pub z: bool,
    /// Carry flag.
    pub c: bool,
    /// Overflow flag.
    pub v: bool,
}

impl Condition {
    /// Decodes the 4-bit condition field used by `B<c>` and `IT`. `0b1110`
    /// is reserved in Thumb (real ARMv7-M routes that bit pattern to `UDF`
    /// instead of a branch) and is rejected here with
    /// [`CmthumbError::Unpredictable`] rather than silently treated as
    /// always-true; callers that register a dedicated `UDF` leaf ahead of
    /// the generic conditional-branch leaf never reach this arm in
    /// practice.
    pub fn decode(bits: &Bitstring) -> Result<Condition, CmthumbError> {
        assert_eq!(bits.width(), 4);
        Ok(match bits.unsigned() {
            0b0000 => Condition::Eq,
            0b0001 => Condition::Ne,
            0b0010 => Condition::Cs,
            0b0011 => Condition::Cc,
            0b0100 => Condition::Mi,
            0b0101 => Condition::Pl,
            0b0110 => Condition::Vs,
            0b0111 => Condition::Vc,
            0b1000 => Condition::Hi,
            0b1001 => Condition::Ls,
            0b1010 => Condition::Ge,
            0b1011 => Condition::Lt,
            0b1100 => Condition::Gt,
            0b1101 => Condition::Le,
            0b1110 => {
                return Err(CmthumbError::Unpredictable(
                    "condition field 0b1110 is reserved in Thumb (UDF), not a branch condition".into(),
                ))
            }
            0b1111 => Condition::Al,
            _ => unreachable!("4-bit field out of range"),
        })
    }

    /// Evaluates the condition against the given flags.
    pub fn check(self, flags: Flags) -> bool {
        match self {
            Condition::Eq => flags.z,
            Condition::Ne => !flags.z,
            Condition::Cs => flags.c,
            Condition::Cc => !flags.c,
            Condition::Mi => flags.n,
            Condition::Pl => !flags.n,
            Condition::Vs => flags.v,
            Condition::Vc => !flags.v,
            Condition::Hi => flags.c && !flags.z,
            Condition::Ls => !flags.c || flags.z,
            Condition::Ge => flags.n == flags.v,
            Condition::Lt => flags.n != flags.v,
            Condition::Gt => !flags.z && (flags.n == flags.v),
            Condition::Le => flags.z || (flags.n != flags.v),
            Condition::Al => true,
        }
    }

    /// The two/three-letter mnemonic suffix (`"eq"`, `"ne"`, `""` for `Al`, ...).
    pub fn mnemonic(self) -> &'static str {
        match self {
            Condition::Eq => "eq",
            Condition::Ne => "ne",
            Condition::Cs => "cs",
            Condition::Cc => "cc",
            Condition::Mi => "mi",
            Condition::Pl => "pl",
            Condition::Vs => "vs",
            Condition::Vc => "vc",
            Condition::Hi => "hi",
            Condition::Ls => "ls",
            Condition::Ge => "ge",
            Condition::Lt => "lt",
            Condition::Gt => "gt",
            Condition::Le => "le",
            Condition::Al => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_checks_zero_flag() {
        let mut f = Flags::default();
        assert!(!Condition::Eq.check(f));
        f.z = true;
        assert!(Condition::Eq.check(f));
    }

    #[test]
    fn gt_combines_z_n_v() {
        let f = Flags { n: true, z: false, c: false, v: true };
        assert!(Condition::Gt.check(f));
        let f = Flags { n: true, z: true, c: false, v: true };
        assert!(!Condition::Gt.check(f));
    }

    #[test]
    fn al_is_always_true() {
        assert!(Condition::Al.check(Flags::default()));
    }

    #[test]
    fn decode_roundtrips_all_codes() {
        for v in 0..16u128 {
            let c = Condition::decode(&Bitstring::new(v, 4)).unwrap();
            assert!(!c.mnemonic().is_empty() || matches!(c, Condition::Al));
        }
    }
}
