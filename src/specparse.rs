//! Parser for the declarative bit-pattern grammar decoder leaves are
//! registered with.
//!
//! ```text
//! start  => field*
//! field  => bit | value
//! bit    => '0' | '1'
//! value  => ident ( '(' intlit? ')' )?
//! ident  => [a-zA-Z][a-zA-Z0-9]*
//! intlit => [0-9]+
//! ```
//!
//! A bare `ident` (no parens) is a 1-bit field. `ident(N)` is an N-bit
//! field. Whitespace is insignificant everywhere. Ported from
//! `cmdis/decoder.py`'s `parse_spec` state machine.

/// One field of a parsed bit-pattern spec: either a literal bit, or a named
/// field with a bit width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecField {
    /// A fixed `0` or `1` bit.
    Bit(u8),
    /// A named field occupying `width` bits, MSB first within the field.
    Named(String, u32),
}

/// Parses a spec string into its ordered list of fields, MSB first (field
/// order matches the order instructions are conventionally written, which
/// callers reverse when assembling a bit-0-aligned mask/match pair).
pub fn parse_spec(spec: &str) -> Vec<SpecField> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Default,
        Ident,
        EnterBitcount,
        Bitcount,
        CloseBitcount,
    }

    let chars: Vec<char> = spec.chars().collect();
    let mut result = Vec::new();
    let mut i = 0usize;
    let mut state = State::Default;
    let mut ident = String::new();
    let mut bitcount = String::new();

    while i < chars.len() {
        let c = chars[i];
        match state {
            State::Default => {
                if c == '0' || c == '1' {
                    if !ident.is_empty() {
                        result.push(SpecField::Named(std::mem::take(&mut ident), 1));
                    }
                    result.push(SpecField::Bit(c as u8 - b'0'));
                } else if c.is_ascii_alphabetic() {
                    if !ident.is_empty() {
                        result.push(SpecField::Named(std::mem::take(&mut ident), 1));
                    }
                    ident.push(c);
                    state = State::Ident;
                } else if c == '(' {
                    state = State::EnterBitcount;
                } else if c.is_whitespace() {
                    // skip
                } else {
                    panic!("parse_spec: unexpected character {c:?} at position {i}");
                }
            }
            State::Ident => {
                if c == '(' {
                    state = State::EnterBitcount;
                } else if !(c.is_ascii_alphanumeric()) {
                    state = State::Default;
                    i -= 1;
                } else {
                    ident.push(c);
                }
            }
            State::EnterBitcount => {
                if c.is_ascii_digit() {
                    bitcount.push(c);
                    state = State::Bitcount;
                } else if c == ')' {
                    bitcount.push('1');
                    state = State::Default;
                } else if c.is_whitespace() {
                    // skip
                } else {
                    panic!("parse_spec: unexpected character {c:?} at position {i}");
                }
            }
            State::Bitcount => {
                if c == ')' {
                    result.push(SpecField::Named(std::mem::take(&mut ident), bitcount.parse().unwrap()));
                    bitcount.clear();
                    state = State::Default;
                } else if !c.is_ascii_digit() {
                    state = State::CloseBitcount;
                } else {
                    bitcount.push(c);
                }
            }
            State::CloseBitcount => {
                if c == ')' {
                    result.push(SpecField::Named(std::mem::take(&mut ident), bitcount.parse().unwrap()));
                    bitcount.clear();
                    state = State::Default;
                } else if c.is_whitespace() {
                    // skip
                } else {
                    panic!("parse_spec: unexpected character {c:?} at position {i}");
                }
            }
        }
        i += 1;
    }

    if !ident.is_empty() {
        let width: u32 = if bitcount.is_empty() { 1 } else { bitcount.parse().unwrap() };
        result.push(SpecField::Named(ident, width));
    }

    result
}

/// Total width in bits covered by a parsed field list.
pub fn spec_width(fields: &[SpecField]) -> u32 {
    fields.iter().map(|f| match f {
        SpecField::Bit(_) => 1,
        SpecField::Named(_, w) => *w,
    }).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_and_whitespace() {
        assert_eq!(parse_spec("0010 0 1"), vec![
            SpecField::Bit(0), SpecField::Bit(0), SpecField::Bit(1), SpecField::Bit(0),
            SpecField::Bit(0), SpecField::Bit(1),
        ]);
    }

    #[test]
    fn named_field_with_explicit_width() {
        assert_eq!(parse_spec("Rd(3)"), vec![SpecField::Named("Rd".into(), 3)]);
    }

    #[test]
    fn named_field_defaults_to_one_bit() {
        assert_eq!(parse_spec("S"), vec![SpecField::Named("S".into(), 1)]);
    }

    #[test]
    fn fixed_value_field_is_four_one_bit_literals() {
        // `foo=0100`-style fixed-value fields are expressed at the call site
        // as the identifier followed immediately by bit literals; parse_spec
        // itself only ever emits bits and named fields, so a fixed-value
        // field decomposes into a named zero-width marker plus the literal
        // bits that make it up. Exercise the literal-bit half here.
        assert_eq!(parse_spec("0100"), vec![
            SpecField::Bit(0), SpecField::Bit(1), SpecField::Bit(0), SpecField::Bit(0),
        ]);
    }

    #[test]
    fn mixed_bits_and_fields() {
        assert_eq!(parse_spec("000110 Rn(3) Rd(3)"), vec![
            SpecField::Bit(0), SpecField::Bit(0), SpecField::Bit(0), SpecField::Bit(1),
            SpecField::Bit(1), SpecField::Bit(0),
            SpecField::Named("Rn".into(), 3),
            SpecField::Named("Rd".into(), 3),
        ]);
    }

    #[test]
    fn empty_parens_means_one_bit() {
        assert_eq!(parse_spec("cond()"), vec![SpecField::Named("cond".into(), 1)]);
    }

    #[test]
    fn total_width_sums_fields() {
        let fields = parse_spec("000110 Rn(3) Rd(3)");
        assert_eq!(spec_width(&fields), 12);
    }
}
