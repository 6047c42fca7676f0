//! Display masks.
//!
//! A mask template interleaves `#` placeholders with literal separators:
//! `###.###.###-##`, `#### ###### #####`.

/// Placeholder character consumed by one input digit.
pub const PLACEHOLDER: char = '#';

/// CPF display mask.
pub const CPF_MASK: &str = "###.###.###-##";

/// CNPJ display mask.
pub const CNPJ_MASK: &str = "##.###.###/####-##";

/// Applies `template` to `digits`.
///
/// Walks the template left to right: each `#` consumes the next digit, any
/// other character is copied verbatim. Output stops as soon as the digits run
/// out, so a short input never ends in a dangling separator. Digits left over
/// once the template is exhausted are appended unchanged, keeping
/// `strip(apply_mask(d)) == d` for every input.
///
/// ## Example
/// ```rust
/// use idforge_core::mask::{apply_mask, CPF_MASK};
///
/// assert_eq!(apply_mask("11144477735", CPF_MASK), "111.444.777-35");
/// assert_eq!(apply_mask("1114", CPF_MASK), "111.4");
/// ```
pub fn apply_mask(digits: &str, template: &str) -> String {
    let mut remaining = digits.chars().peekable();
    let mut out = String::with_capacity(template.len().max(digits.len()));

    for slot in template.chars() {
        if remaining.peek().is_none() {
            break;
        }
        if slot == PLACEHOLDER {
            if let Some(digit) = remaining.next() {
                out.push(digit);
            }
        } else {
            out.push(slot);
        }
    }

    out.extend(remaining);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{digits_only, digits_to_string};

    #[test]
    fn test_apply_mask_full() {
        assert_eq!(apply_mask("11222333000181", CNPJ_MASK), "11.222.333/0001-81");
        assert_eq!(
            apply_mask("378282246310005", "#### ###### #####"),
            "3782 822463 10005"
        );
    }

    #[test]
    fn test_apply_mask_stops_when_digits_run_out() {
        assert_eq!(
            apply_mask("4111111111111111", "#### #### #### #### ###"),
            "4111 1111 1111 1111"
        );
        assert_eq!(apply_mask("", CPF_MASK), "");
    }

    #[test]
    fn test_apply_mask_keeps_overflow_digits() {
        assert_eq!(apply_mask("123456", "##-##"), "12-3456");
    }

    #[test]
    fn test_apply_mask_round_trip() {
        for digits in ["1", "11144477735", "6011000990139424", "1234567890123456789"] {
            let masked = apply_mask(digits, "#### #### #### #### ###");
            assert_eq!(digits_to_string(&digits_only(&masked)), digits);
        }
    }
}
