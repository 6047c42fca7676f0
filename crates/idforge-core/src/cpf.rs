//! # CPF Engine
//!
//! Cadastro de Pessoas Físicas: the 11-digit individual taxpayer ID.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   1 1 1 . 4 4 4 . 7 7 7 - 3 5                                           │
//! │   └───────┬───────┘   ▲   └┬┘                                           │
//! │     base (9 digits)   │    └── check digits A, B (mod 11)              │
//! │                       └── 9th digit: fiscal region that issued it      │
//! │                                                                         │
//! │   A = mod11(base,     [10 9 8 7 6 5 4 3 2])                             │
//! │   B = mod11(base + A, [11 10 9 8 7 6 5 4 3 2])                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::checksum::{digits_only, digits_to_string, is_repeated_sequence, weighted_mod11};
use crate::error::EngineResult;
use crate::mask::{apply_mask, CPF_MASK};
use crate::traits::{Format, Generate, Identify, Validate};
use crate::types::{GeneratedIdentifier, InvalidReason, MaskMode, ValidationOutcome};
use crate::validation::validate_region;

/// Total CPF length.
pub const CPF_LENGTH: usize = 11;

/// Base digits before the two check digits.
const BASE_LENGTH: usize = 9;

const FIRST_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

/// States served by each fiscal region, indexed by the 9th digit.
const REGIONS: [&[&str]; 10] = [
    &["RS"],
    &["DF", "GO", "MS", "MT", "TO"],
    &["AC", "AM", "AP", "PA", "RO", "RR"],
    &["CE", "MA", "PI"],
    &["AL", "PB", "PE", "RN"],
    &["BA", "SE"],
    &["MG"],
    &["ES", "RJ"],
    &["SP"],
    &["PR", "SC"],
];

// =============================================================================
// Fiscal Region
// =============================================================================

/// The Receita Federal region that issued a CPF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FiscalRegion {
    /// The 9th digit of the CPF (0-9).
    pub digit: u8,
    /// Two-letter codes of the states in the region.
    pub states: Vec<String>,
}

impl FiscalRegion {
    /// Region for a 9th-digit value; only the last decimal digit counts.
    fn of(digit: u8) -> Self {
        let digit = digit % 10;
        FiscalRegion {
            digit,
            states: REGIONS[usize::from(digit)]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// =============================================================================
// Generation Options
// =============================================================================

/// Options for [`CpfEngine::generate`](Generate::generate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CpfOptions {
    /// Forces the fiscal region digit (0-9); random when `None`.
    pub region: Option<u8>,
    /// Presentation of the generated value.
    pub mask: MaskMode,
}

// =============================================================================
// Engine
// =============================================================================

/// Stateless CPF validator and generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpfEngine;

impl CpfEngine {
    pub const fn new() -> Self {
        CpfEngine
    }

    /// Computes both check digits for a 9-digit base.
    fn check_digits(base: &[u8; BASE_LENGTH]) -> (u8, u8) {
        let first = weighted_mod11(base, &FIRST_WEIGHTS);

        let mut extended = [0u8; BASE_LENGTH + 1];
        extended[..BASE_LENGTH].copy_from_slice(base);
        extended[BASE_LENGTH] = first;
        let second = weighted_mod11(&extended, &SECOND_WEIGHTS);

        (first, second)
    }

    /// Strips separators and enforces length, repetition and check digits.
    fn checked_digits(input: &str) -> Result<Vec<u8>, InvalidReason> {
        let digits = digits_only(input);

        if digits.len() != CPF_LENGTH {
            return Err(InvalidReason::WrongLength);
        }
        if is_repeated_sequence(&digits) {
            return Err(InvalidReason::RepeatedDigitSequence);
        }

        let mut base = [0u8; BASE_LENGTH];
        base.copy_from_slice(&digits[..BASE_LENGTH]);
        let (first, second) = Self::check_digits(&base);
        if digits[9] != first || digits[10] != second {
            return Err(InvalidReason::CheckDigitMismatch);
        }

        Ok(digits)
    }

    /// Draws a valid CPF as bare digits. `region` must already be checked.
    fn generate_digits<R: Rng + ?Sized>(&self, region: Option<u8>, rng: &mut R) -> String {
        let mut base = [0u8; BASE_LENGTH];
        loop {
            for digit in base.iter_mut() {
                *digit = rng.gen_range(0..10);
            }
            if let Some(region) = region {
                base[BASE_LENGTH - 1] = region;
            }
            // 000000000-00 style sequences check out arithmetically but are rejected
            if !is_repeated_sequence(&base) {
                break;
            }
        }

        let (first, second) = Self::check_digits(&base);
        let mut digits = base.to_vec();
        digits.extend([first, second]);
        digits_to_string(&digits)
    }
}

impl Validate for CpfEngine {
    fn validate(&self, input: &str) -> ValidationOutcome {
        Self::checked_digits(input).into()
    }
}

impl Format for CpfEngine {
    fn format(&self, input: &str, mask: MaskMode) -> Result<String, InvalidReason> {
        let digits = digits_only(input);
        if digits.len() != CPF_LENGTH {
            return Err(InvalidReason::WrongLength);
        }

        let bare = digits_to_string(&digits);
        Ok(match mask {
            MaskMode::Masked => apply_mask(&bare, CPF_MASK),
            MaskMode::Unmasked => bare,
        })
    }
}

impl Identify for CpfEngine {
    type Identity = FiscalRegion;

    fn identify(&self, input: &str) -> Result<FiscalRegion, InvalidReason> {
        let digits = Self::checked_digits(input)?;
        Ok(FiscalRegion::of(digits[BASE_LENGTH - 1]))
    }
}

impl Generate for CpfEngine {
    type Options = CpfOptions;
    type Output = GeneratedIdentifier;

    fn generate<R: Rng + ?Sized>(
        &self,
        options: &CpfOptions,
        rng: &mut R,
    ) -> EngineResult<GeneratedIdentifier> {
        if let Some(region) = options.region {
            validate_region(region)?;
        }

        let digits = self.generate_digits(options.region, rng);
        let display = match options.mask {
            MaskMode::Masked => apply_mask(&digits, CPF_MASK),
            MaskMode::Unmasked => digits.clone(),
        };

        Ok(GeneratedIdentifier { digits, display })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_validate_known_vectors() {
        let cpf = CpfEngine::new();
        assert_eq!(cpf.validate("111.444.777-35"), ValidationOutcome::Valid);
        assert_eq!(cpf.validate("11144477735"), ValidationOutcome::Valid);
        assert_eq!(
            cpf.validate("111.111.111-11"),
            ValidationOutcome::Invalid(InvalidReason::RepeatedDigitSequence)
        );
        assert_eq!(
            cpf.validate("111.444.777-36"),
            ValidationOutcome::Invalid(InvalidReason::CheckDigitMismatch)
        );
        assert_eq!(
            cpf.validate("111.444.777-45"),
            ValidationOutcome::Invalid(InvalidReason::CheckDigitMismatch)
        );
    }

    #[test]
    fn test_check_digits() {
        assert_eq!(CpfEngine::check_digits(&[1, 1, 1, 4, 4, 4, 7, 7, 7]), (3, 5));
        assert_eq!(CpfEngine::check_digits(&[0; BASE_LENGTH]), (0, 0));
    }

    #[test]
    fn test_validate_wrong_length() {
        let cpf = CpfEngine::new();
        assert_eq!(
            cpf.validate("1114447773"),
            ValidationOutcome::Invalid(InvalidReason::WrongLength)
        );
        assert_eq!(
            cpf.validate(""),
            ValidationOutcome::Invalid(InvalidReason::WrongLength)
        );
        assert_eq!(
            cpf.validate("111444777350"),
            ValidationOutcome::Invalid(InvalidReason::WrongLength)
        );
    }

    #[test]
    fn test_format() {
        let cpf = CpfEngine::new();
        assert_eq!(
            cpf.format("11144477735", MaskMode::Masked).unwrap(),
            "111.444.777-35"
        );
        assert_eq!(
            cpf.format("111.444.777-35", MaskMode::Unmasked).unwrap(),
            "11144477735"
        );
        // Formatting is presentation only: bad check digits still format
        assert_eq!(
            cpf.format("11144477700", MaskMode::Masked).unwrap(),
            "111.444.777-00"
        );
        assert_eq!(
            cpf.format("123", MaskMode::Masked),
            Err(InvalidReason::WrongLength)
        );
    }

    #[test]
    fn test_identify_region() {
        let cpf = CpfEngine::new();
        let region = cpf.identify("111.444.777-35").unwrap();
        assert_eq!(region.digit, 7);
        assert_eq!(region.states, vec!["ES", "RJ"]);

        assert_eq!(
            cpf.identify("111.444.777-00"),
            Err(InvalidReason::CheckDigitMismatch)
        );
        assert_eq!(cpf.identify("123"), Err(InvalidReason::WrongLength));

        for digit in 0..10 {
            let region = FiscalRegion::of(digit);
            assert_eq!(region.digit, digit);
            assert!(!region.states.is_empty());
        }
    }

    #[test]
    fn test_generate_round_trips() {
        let cpf = CpfEngine::new();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            let generated = cpf.generate(&CpfOptions::default(), &mut rng).unwrap();
            assert_eq!(generated.digits.len(), CPF_LENGTH);
            assert_eq!(cpf.validate(&generated.digits), ValidationOutcome::Valid);
            assert_eq!(cpf.validate(&generated.display), ValidationOutcome::Valid);
        }
    }

    #[test]
    fn test_generate_for_region() {
        let cpf = CpfEngine::new();
        let mut rng = StdRng::seed_from_u64(8);
        let options = CpfOptions {
            region: Some(8),
            mask: MaskMode::Unmasked,
        };

        let generated = cpf.generate(&options, &mut rng).unwrap();
        assert_eq!(generated.digits, generated.display);
        assert_eq!(cpf.identify(&generated.digits).unwrap().states, vec!["SP"]);

        let bad = CpfOptions {
            region: Some(10),
            ..CpfOptions::default()
        };
        assert!(cpf.generate(&bad, &mut rng).is_err());
    }
}
