//! # CNPJ Engine
//!
//! Cadastro Nacional da Pessoa Jurídica: the 14-digit legal-entity ID.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   1 1 . 2 2 2 . 3 3 3 / 0 0 0 1 - 8 1                                   │
//! │   └──────┬───────────┘  └──┬──┘   └┬┘                                   │
//! │     root (8 digits)    branch    check digits A, B (mod 11)            │
//! │                        0001 = headquarters (matriz)                    │
//! │                                                                         │
//! │   A = mod11(base,     [5 4 3 2 9 8 7 6 5 4 3 2])                        │
//! │   B = mod11(base + A, [6 5 4 3 2 9 8 7 6 5 4 3 2])                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::checksum::{digits_only, digits_to_string, is_repeated_sequence, weighted_mod11};
use crate::error::EngineResult;
use crate::mask::{apply_mask, CNPJ_MASK};
use crate::traits::{Format, Generate, Identify, Validate};
use crate::types::{GeneratedIdentifier, InvalidReason, MaskMode, ValidationOutcome};

/// Total CNPJ length.
pub const CNPJ_LENGTH: usize = 14;

const BASE_LENGTH: usize = 12;
const ROOT_LENGTH: usize = 8;

/// Branch number of the headquarters establishment.
pub const HEADQUARTERS_BRANCH: &str = "0001";

const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

// =============================================================================
// Establishment
// =============================================================================

/// What the digits of a CNPJ say about the establishment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Establishment {
    /// First 8 digits, shared by every establishment of the company.
    pub root: String,
    /// Digits 9-12, the establishment number.
    pub branch: String,
    /// True for branch `0001` (matriz).
    pub headquarters: bool,
}

// =============================================================================
// Generation Options
// =============================================================================

/// Which establishment number a generated CNPJ carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BranchMode {
    /// Always `0001`.
    #[default]
    Headquarters,
    /// Uniform in `0001..=9999`.
    Random,
}

/// Options for [`CnpjEngine::generate`](Generate::generate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CnpjOptions {
    pub branch: BranchMode,
    pub mask: MaskMode,
}

// =============================================================================
// Engine
// =============================================================================

/// Stateless CNPJ validator and generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CnpjEngine;

impl CnpjEngine {
    pub const fn new() -> Self {
        CnpjEngine
    }

    /// Computes both check digits for a 12-digit base.
    fn check_digits(base: &[u8; BASE_LENGTH]) -> (u8, u8) {
        let first = weighted_mod11(base, &FIRST_WEIGHTS);

        let mut extended = [0u8; BASE_LENGTH + 1];
        extended[..BASE_LENGTH].copy_from_slice(base);
        extended[BASE_LENGTH] = first;
        let second = weighted_mod11(&extended, &SECOND_WEIGHTS);

        (first, second)
    }

    fn checked_digits(input: &str) -> Result<Vec<u8>, InvalidReason> {
        let digits = digits_only(input);

        if digits.len() != CNPJ_LENGTH {
            return Err(InvalidReason::WrongLength);
        }
        if is_repeated_sequence(&digits) {
            return Err(InvalidReason::RepeatedDigitSequence);
        }

        let mut base = [0u8; BASE_LENGTH];
        base.copy_from_slice(&digits[..BASE_LENGTH]);
        let (first, second) = Self::check_digits(&base);
        if digits[12] != first || digits[13] != second {
            return Err(InvalidReason::CheckDigitMismatch);
        }

        Ok(digits)
    }

    fn generate_digits<R: Rng + ?Sized>(&self, branch: BranchMode, rng: &mut R) -> String {
        let mut base = [0u8; BASE_LENGTH];
        loop {
            for digit in base[..ROOT_LENGTH].iter_mut() {
                *digit = rng.gen_range(0..10);
            }
            let establishment: u16 = match branch {
                BranchMode::Headquarters => 1,
                BranchMode::Random => rng.gen_range(1..=9999),
            };
            let mut rest = establishment;
            for slot in base[ROOT_LENGTH..].iter_mut().rev() {
                *slot = (rest % 10) as u8;
                rest /= 10;
            }
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

impl Validate for CnpjEngine {
    fn validate(&self, input: &str) -> ValidationOutcome {
        Self::checked_digits(input).into()
    }
}

impl Format for CnpjEngine {
    fn format(&self, input: &str, mask: MaskMode) -> Result<String, InvalidReason> {
        let digits = digits_only(input);
        if digits.len() != CNPJ_LENGTH {
            return Err(InvalidReason::WrongLength);
        }

        let bare = digits_to_string(&digits);
        Ok(match mask {
            MaskMode::Masked => apply_mask(&bare, CNPJ_MASK),
            MaskMode::Unmasked => bare,
        })
    }
}

impl Identify for CnpjEngine {
    type Identity = Establishment;

    fn identify(&self, input: &str) -> Result<Establishment, InvalidReason> {
        let digits = Self::checked_digits(input)?;
        let branch = digits_to_string(&digits[ROOT_LENGTH..BASE_LENGTH]);

        Ok(Establishment {
            root: digits_to_string(&digits[..ROOT_LENGTH]),
            headquarters: branch == HEADQUARTERS_BRANCH,
            branch,
        })
    }
}

impl Generate for CnpjEngine {
    type Options = CnpjOptions;
    type Output = GeneratedIdentifier;

    fn generate<R: Rng + ?Sized>(
        &self,
        options: &CnpjOptions,
        rng: &mut R,
    ) -> EngineResult<GeneratedIdentifier> {
        let digits = self.generate_digits(options.branch, rng);
        let display = match options.mask {
            MaskMode::Masked => apply_mask(&digits, CNPJ_MASK),
            MaskMode::Unmasked => digits.clone(),
        };

        Ok(GeneratedIdentifier { digits, display })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
