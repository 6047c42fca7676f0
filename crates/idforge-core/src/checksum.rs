//! # Checksum Primitives
//!
//! Check digit arithmetic shared by the CPF, CNPJ and card engines.
//!
//! ## Luhn Asymmetry
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Validation (full number)         Check digit (partial number)          │
//! │                                                                         │
//! │   4 1 1 1 ... 1 1 1 [1]            4 1 1 1 ... 1 1 1  ?                 │
//! │               x2    x1                       x2    x1 ← not present     │
//! │                     ▲                        ▲                          │
//! │        rightmost digit untouched   rightmost PARTIAL digit is doubled   │
//! │                                                                         │
//! │  Getting this backwards produces numbers that fail their own check.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

/// Extracts the ASCII digits of `input` as numeric values.
///
/// Separators (`.`, `-`, `/`, spaces) and any other character are dropped.
///
/// ## Example
/// ```rust
/// use idforge_core::checksum::digits_only;
///
/// assert_eq!(digits_only("111.444-7"), vec![1, 1, 1, 4, 4, 4, 7]);
/// ```
pub fn digits_only(input: &str) -> Vec<u8> {
    input
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect()
}

/// Renders digit values back into a string.
pub fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

/// Returns true when every digit equals the first one.
///
/// An empty slice counts as repeated.
pub fn is_repeated_sequence(digits: &[u8]) -> bool {
    digits.windows(2).all(|pair| pair[0] == pair[1])
}

/// Weighted-sum modulo 11 check digit.
///
/// `11 - (Σ digit·weight mod 11)`, with results above 9 mapped to 0.
///
/// ## Example
/// ```rust
/// use idforge_core::checksum::weighted_mod11;
///
/// let base = [1, 1, 1, 4, 4, 4, 7, 7, 7];
/// assert_eq!(weighted_mod11(&base, &[10, 9, 8, 7, 6, 5, 4, 3, 2]), 3);
/// ```
pub fn weighted_mod11(digits: &[u8], weights: &[u32]) -> u8 {
    debug_assert_eq!(digits.len(), weights.len());

    let sum: u32 = digits
        .iter()
        .zip(weights)
        .map(|(&d, &w)| u32::from(d) * w)
        .sum();

    match 11 - sum % 11 {
        check @ 0..=9 => check as u8,
        _ => 0,
    }
}

/// Luhn doubling: doubled digits above 9 lose 9.
#[inline]
fn luhn_double(digit: u8) -> u32 {
    let doubled = u32::from(digit) * 2;
    if doubled > 9 {
        doubled - 9
    } else {
        doubled
    }
}

/// Validates a complete number with the Luhn mod-10 checksum.
///
/// Every second digit counting from the rightmost one (which is left
/// untouched) is doubled. An empty slice is never valid.
///
/// ## Example
/// ```rust
/// use idforge_core::checksum::{digits_only, luhn_validate};
///
/// assert!(luhn_validate(&digits_only("4111111111111111")));
/// assert!(!luhn_validate(&digits_only("4111111111111112")));
/// ```
pub fn luhn_validate(digits: &[u8]) -> bool {
    if digits.is_empty() {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                luhn_double(d)
            } else {
                u32::from(d)
            }
        })
        .sum();

    sum % 10 == 0
}

/// Computes the Luhn check digit to append to `partial`.
///
/// The rightmost digit of `partial` sits one position left of the future
/// check digit, so it is the first one doubled.
pub fn luhn_check_digit(partial: &[u8]) -> u8 {
    let sum: u32 = partial
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 0 {
                luhn_double(d)
            } else {
                u32::from(d)
            }
        })
        .sum();

    ((10 - sum % 10) % 10) as u8
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("11.222.333/0001-81").len(), 14);
        assert_eq!(digits_only(" 4111 1111 "), vec![4, 1, 1, 1, 1, 1, 1, 1]);
        assert!(digits_only("abc").is_empty());
        assert_eq!(digits_to_string(&[0, 4, 9]), "049");
    }

    #[test]
    fn test_is_repeated_sequence() {
        assert!(is_repeated_sequence(&[7; 11]));
        assert!(!is_repeated_sequence(&[7, 7, 7, 1]));
    }

    #[test]
    fn test_weighted_mod11() {
        // CPF 111.444.777-35
        let base = [1, 1, 1, 4, 4, 4, 7, 7, 7];
        assert_eq!(weighted_mod11(&base, &[10, 9, 8, 7, 6, 5, 4, 3, 2]), 3);
        let with_first = [1, 1, 1, 4, 4, 4, 7, 7, 7, 3];
        assert_eq!(
            weighted_mod11(&with_first, &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]),
            5
        );
    }

    #[test]
    fn test_weighted_mod11_maps_ten_and_eleven_to_zero() {
        // remainder 0 -> 11 -> 0
        assert_eq!(weighted_mod11(&[0, 0], &[2, 3]), 0);
        // sum 12 -> remainder 1 -> 10 -> 0
        assert_eq!(weighted_mod11(&[6], &[2]), 0);
        // sum 10 -> remainder 10 -> 1
        assert_eq!(weighted_mod11(&[5], &[2]), 1);
    }

    #[test]
    fn test_luhn_validate() {
        assert!(luhn_validate(&digits_only("4111111111111111")));
        assert!(luhn_validate(&digits_only("5500 0000 0000 0004")));
        assert!(luhn_validate(&digits_only("378282246310005")));
        assert!(!luhn_validate(&digits_only("4111111111111112")));
        assert!(!luhn_validate(&[]));
    }

    #[test]
    fn test_luhn_check_digit_round_trips() {
        let partial = digits_only("411111111111111");
        assert_eq!(luhn_check_digit(&partial), 1);

        let partial = digits_only("37828224631000");
        assert_eq!(luhn_check_digit(&partial), 5);

        for seed in ["401178", "5", "65003512345", "222100000000000"] {
            let mut digits = digits_only(seed);
            digits.push(luhn_check_digit(&digits));
            assert!(luhn_validate(&digits), "{seed} should round-trip");
        }
    }
}
