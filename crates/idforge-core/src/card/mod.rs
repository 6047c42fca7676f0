//! # Card Engine
//!
//! Luhn-protected payment card numbers.
//!
//! ## Generation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  generate_number(Elo)                                                   │
//! │       │                                                                 │
//! │       ├── pick prefix     "650031"         (random, from profile)      │
//! │       ├── pick length     16               (random, from profile)      │
//! │       ├── pad digits      "650031" + 9 random digits                   │
//! │       ├── append Luhn     + luhn_check_digit(partial)                  │
//! │       │                                                                 │
//! │       └── identify(result) == Elo ?  yes → done                        │
//! │                                      no  → draw again (a longer prefix │
//! │                                            of another brand caught it) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod brand;
pub mod expiry;
pub mod registry;

pub use brand::{BrandSelection, CardBrand};
pub use expiry::{ExpiryDate, ExpiryFormat, ExpiryKind, ExpiryPolicy};
pub use registry::{BrandProfile, BrandRegistry};

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::checksum::{digits_only, digits_to_string, luhn_check_digit, luhn_validate};
use crate::error::{EngineError, EngineResult};
use crate::mask::apply_mask;
use crate::traits::{Format, Generate, Identify, Validate};
use crate::types::{InvalidReason, MaskMode, ValidationOutcome};

/// Shortest card number any brand issues.
pub const MIN_CARD_LENGTH: usize = 13;

/// Longest card number any brand issues.
pub const MAX_CARD_LENGTH: usize = 19;

/// Mask used when a number's brand cannot be identified.
const FALLBACK_MASK: &str = "#### #### #### #### ###";

/// Draws per number before giving up on a brand.
const MAX_GENERATION_ATTEMPTS: usize = 64;

// =============================================================================
// Output Types
// =============================================================================

/// Expiry attached to a generated card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CardExpiry {
    pub month: u32,
    pub year: i32,
    /// Rendered in the requested [`ExpiryFormat`].
    pub text: String,
    /// Evaluated against the same `today` used to draw the date.
    pub expired: bool,
}

/// A synthetic card with optional CVV and expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeneratedCard {
    pub brand: CardBrand,
    /// Bare digits.
    pub number: String,
    /// `number` in the requested [`MaskMode`].
    pub display: String,
    pub cvv: Option<String>,
    pub expiry: Option<CardExpiry>,
}

/// Options for [`CardEngine::generate`](Generate::generate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardOptions {
    pub brand: CardBrand,
    pub mask: MaskMode,
    pub include_cvv: bool,
    /// Attach an expiry date drawn with this policy.
    pub expiry: Option<ExpiryPolicy>,
    /// Reference date for expiry generation and the expired flag.
    pub today: NaiveDate,
}

// =============================================================================
// Engine
// =============================================================================

/// Card validator and generator over an immutable [`BrandRegistry`].
#[derive(Debug, Clone)]
pub struct CardEngine {
    registry: BrandRegistry,
}

impl CardEngine {
    /// Builds the engine and materializes the brand table.
    pub fn new() -> EngineResult<Self> {
        Ok(Self::with_registry(BrandRegistry::new()?))
    }

    pub fn with_registry(registry: BrandRegistry) -> Self {
        CardEngine { registry }
    }

    pub fn registry(&self) -> &BrandRegistry {
        &self.registry
    }

    fn profile_for(&self, brand: CardBrand) -> EngineResult<&BrandProfile> {
        self.registry
            .profile(brand)
            .ok_or_else(|| EngineError::UnsupportedBrandForGeneration {
                name: brand.name().to_string(),
            })
    }

    /// Resolves the brand of `number`, ignoring separators.
    ///
    /// Total: any input yields a brand or `None`.
    pub fn identify_brand(&self, number: &str) -> Option<CardBrand> {
        self.registry
            .identify(&digits_to_string(&digits_only(number)))
    }

    /// Luhn check on the digits of `number`.
    pub fn validate_luhn(&self, number: &str) -> bool {
        luhn_validate(&digits_only(number))
    }

    /// Draws a number for `brand` that passes Luhn and identifies as `brand`.
    pub fn generate_number<R: Rng + ?Sized>(
        &self,
        brand: CardBrand,
        rng: &mut R,
    ) -> EngineResult<String> {
        let profile = self.profile_for(brand)?;

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let (Some(prefix), Some(&length)) =
                (profile.prefixes.choose(rng), profile.lengths.choose(rng))
            else {
                return Err(EngineError::Configuration(format!(
                    "{brand} has an empty prefix or length set"
                )));
            };

            let mut digits = digits_only(prefix);
            while digits.len() < length - 1 {
                digits.push(rng.gen_range(0..10));
            }
            digits.push(luhn_check_digit(&digits));

            let number = digits_to_string(&digits);
            if self.registry.identify(&number) == Some(brand) {
                return Ok(number);
            }
            debug!(%brand, attempt, %number, "Discarded number claimed by a longer prefix");
        }

        warn!(%brand, attempts = MAX_GENERATION_ATTEMPTS, "Card generation exhausted");
        Err(EngineError::Configuration(format!(
            "no {brand} number identified as {brand} after {MAX_GENERATION_ATTEMPTS} draws"
        )))
    }

    /// Draws a CVV of the brand's length.
    pub fn generate_cvv<R: Rng + ?Sized>(
        &self,
        brand: CardBrand,
        rng: &mut R,
    ) -> EngineResult<String> {
        let profile = self.profile_for(brand)?;
        Ok((0..profile.cvv_length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect())
    }

    /// Draws an expiry date relative to `today`.
    pub fn generate_expiry<R: Rng + ?Sized>(
        &self,
        policy: &ExpiryPolicy,
        today: NaiveDate,
        rng: &mut R,
    ) -> ExpiryDate {
        expiry::generate_expiry(policy, today, rng)
    }

    /// Whether `expiry` (`MM/YY`, `MM/YYYY` or `YYYY-MM`) has passed.
    pub fn is_expired(&self, expiry: &str, today: NaiveDate) -> Option<bool> {
        expiry::is_expired(expiry, today)
    }

    /// Renders `number` with `brand`'s display mask.
    pub fn format_with_mask(&self, number: &str, brand: CardBrand) -> EngineResult<String> {
        let profile = self.profile_for(brand)?;
        Ok(apply_mask(&digits_to_string(&digits_only(number)), profile.mask))
    }

    fn checked_number(&self, input: &str) -> Result<CardBrand, InvalidReason> {
        let digits = digits_only(input);

        if !(MIN_CARD_LENGTH..=MAX_CARD_LENGTH).contains(&digits.len()) {
            return Err(InvalidReason::WrongLength);
        }
        if !luhn_validate(&digits) {
            return Err(InvalidReason::LuhnFailure);
        }

        self.registry
            .identify(&digits_to_string(&digits))
            .ok_or(InvalidReason::UnidentifiedBrand)
    }

    /// Validates `input` and reports the brand when it is valid.
    pub fn validate_with_brand(&self, input: &str) -> (ValidationOutcome, Option<CardBrand>) {
        match self.checked_number(input) {
            Ok(brand) => (ValidationOutcome::Valid, Some(brand)),
            Err(reason) => (ValidationOutcome::Invalid(reason), None),
        }
    }
}

impl Validate for CardEngine {
    fn validate(&self, input: &str) -> ValidationOutcome {
        self.checked_number(input).into()
    }
}

impl Format for CardEngine {
    fn format(&self, input: &str, mask: MaskMode) -> Result<String, InvalidReason> {
        let digits = digits_to_string(&digits_only(input));
        if !(MIN_CARD_LENGTH..=MAX_CARD_LENGTH).contains(&digits.len()) {
            return Err(InvalidReason::WrongLength);
        }

        Ok(match mask {
            MaskMode::Unmasked => digits,
            MaskMode::Masked => {
                let template = self
                    .registry
                    .identify(&digits)
                    .and_then(|brand| self.registry.profile(brand))
                    .map_or(FALLBACK_MASK, |profile| profile.mask);
                apply_mask(&digits, template)
            }
        })
    }
}

impl Identify for CardEngine {
    type Identity = CardBrand;

    fn identify(&self, input: &str) -> Result<CardBrand, InvalidReason> {
        self.identify_brand(input)
            .ok_or(InvalidReason::UnidentifiedBrand)
    }
}

impl Generate for CardEngine {
    type Options = CardOptions;
    type Output = GeneratedCard;

    fn generate<R: Rng + ?Sized>(
        &self,
        options: &CardOptions,
        rng: &mut R,
    ) -> EngineResult<GeneratedCard> {
        let brand = options.brand;
        let number = self.generate_number(brand, rng)?;

        let display = match options.mask {
            MaskMode::Masked => self.format_with_mask(&number, brand)?,
            MaskMode::Unmasked => number.clone(),
        };

        let cvv = if options.include_cvv {
            Some(self.generate_cvv(brand, rng)?)
        } else {
            None
        };

        let expiry = options.expiry.map(|policy| {
            let date = self.generate_expiry(&policy, options.today, rng);
            CardExpiry {
                month: date.month,
                year: date.year,
                text: date.format(policy.format),
                expired: date.is_expired_at(options.today),
            }
        });

        Ok(GeneratedCard {
            brand,
            number,
            display,
            cvv,
            expiry,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
