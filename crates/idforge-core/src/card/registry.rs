//! # Brand Registry
//!
//! Static issuer table and longest-prefix brand identification.
//!
//! ## Prefix Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Candidates sorted by prefix length, longest first:                     │
//! │                                                                         │
//! │   "401178" Elo ─┐                                                       │
//! │   "650031" Elo  │ 6 digits                                              │
//! │   "6011" Discover 4 digits                                              │
//! │   "2221".."2720" Mastercard                                             │
//! │   "65" Discover, "51".."55" Mastercard, "34" Amex   2 digits           │
//! │   "4" Visa                                          1 digit             │
//! │                                                                         │
//! │  4011 7812 3456 7890 (16)  →  "401178" Elo  (checked before "4" Visa)  │
//! │  First candidate whose prefix matches AND whose brand allows the       │
//! │  number's length wins.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table is materialized once in [`BrandRegistry::new`] and never
//! mutated afterwards, so a registry can be shared freely between threads.

use tracing::debug;

use crate::card::brand::CardBrand;
use crate::error::{EngineError, EngineResult};

// =============================================================================
// Static Table
// =============================================================================

/// A numeric prefix range expanded to fixed-width strings.
///
/// `start` and `end` must have the same number of digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixRange {
    pub start: u32,
    pub end: u32,
    pub step: u32,
}

/// Declarative description of one brand.
#[derive(Debug, Clone, Copy)]
pub struct BrandSpec {
    pub brand: CardBrand,
    pub prefixes: &'static [&'static str],
    pub ranges: &'static [PrefixRange],
    pub lengths: &'static [usize],
    pub cvv_length: usize,
    pub mask: &'static str,
}

const SIXTEEN: &str = "#### #### #### ####";
const UP_TO_NINETEEN: &str = "#### #### #### #### ###";

/// Issuer table, in registry order.
pub const BRAND_TABLE: &[BrandSpec] = &[
    BrandSpec {
        brand: CardBrand::Visa,
        prefixes: &["4"],
        ranges: &[],
        lengths: &[13, 16, 19],
        cvv_length: 3,
        mask: UP_TO_NINETEEN,
    },
    BrandSpec {
        brand: CardBrand::Mastercard,
        prefixes: &[],
        ranges: &[
            PrefixRange {
                start: 51,
                end: 55,
                step: 1,
            },
            PrefixRange {
                start: 2221,
                end: 2720,
                step: 1,
            },
        ],
        lengths: &[16],
        cvv_length: 3,
        mask: SIXTEEN,
    },
    BrandSpec {
        brand: CardBrand::Amex,
        prefixes: &["34", "37"],
        ranges: &[],
        lengths: &[15],
        cvv_length: 4,
        mask: "#### ###### #####",
    },
    BrandSpec {
        brand: CardBrand::Elo,
        prefixes: &[
            "401178", "401179", "431274", "438935", "451416", "457393", "457631", "457632",
            "504175", "506699", "506715", "506718", "509000", "509048", "627780", "636297",
            "636368", "650031", "650032", "650033", "650035", "650036", "650405", "650485",
            "650541", "650700", "650720", "650901", "651652", "655000", "655021",
        ],
        ranges: &[],
        lengths: &[16],
        cvv_length: 3,
        mask: SIXTEEN,
    },
    BrandSpec {
        brand: CardBrand::Hipercard,
        prefixes: &["606282", "384100", "384140", "384160"],
        ranges: &[],
        lengths: &[13, 16, 19],
        cvv_length: 3,
        mask: UP_TO_NINETEEN,
    },
    BrandSpec {
        brand: CardBrand::Diners,
        prefixes: &["300", "301", "302", "303", "304", "305", "36", "38"],
        ranges: &[],
        lengths: &[14],
        cvv_length: 3,
        mask: "#### ###### ####",
    },
    BrandSpec {
        brand: CardBrand::Discover,
        prefixes: &["6011", "644", "645", "646", "647", "648", "649", "65"],
        ranges: &[],
        lengths: &[16, 19],
        cvv_length: 3,
        mask: UP_TO_NINETEEN,
    },
    BrandSpec {
        brand: CardBrand::Jcb,
        prefixes: &[],
        ranges: &[PrefixRange {
            start: 3528,
            end: 3589,
            step: 1,
        }],
        lengths: &[16, 17, 18, 19],
        cvv_length: 3,
        mask: UP_TO_NINETEEN,
    },
    BrandSpec {
        brand: CardBrand::Aura,
        prefixes: &["50"],
        ranges: &[],
        lengths: &[16],
        cvv_length: 3,
        mask: SIXTEEN,
    },
];

// =============================================================================
// Materialized Profiles
// =============================================================================

/// A brand with its prefix ranges expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandProfile {
    pub brand: CardBrand,
    /// Concrete prefix strings, explicit ones first.
    pub prefixes: Vec<String>,
    /// Allowed total lengths, including the check digit.
    pub lengths: Vec<usize>,
    pub cvv_length: usize,
    /// Display template; `#` is one digit.
    pub mask: &'static str,
}

impl BrandProfile {
    /// Returns true if `len` is one of the brand's lengths.
    #[inline]
    pub fn accepts_length(&self, len: usize) -> bool {
        self.lengths.contains(&len)
    }

    fn from_spec(spec: &BrandSpec) -> EngineResult<Self> {
        let brand = spec.brand;

        let mut prefixes: Vec<String> = spec.prefixes.iter().map(|p| p.to_string()).collect();
        for range in spec.ranges {
            prefixes.extend(expand_range(brand, range)?);
        }

        if prefixes.is_empty() {
            return Err(EngineError::Configuration(format!(
                "{brand} has no prefixes"
            )));
        }
        if spec.lengths.is_empty() {
            return Err(EngineError::Configuration(format!("{brand} has no lengths")));
        }
        if !matches!(spec.cvv_length, 3 | 4) {
            return Err(EngineError::Configuration(format!(
                "{brand} CVV length {} is not 3 or 4",
                spec.cvv_length
            )));
        }

        let shortest = spec.lengths.iter().copied().min().unwrap_or(0);
        if let Some(bad) = prefixes
            .iter()
            .find(|p| p.is_empty() || p.len() >= shortest || !p.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(EngineError::Configuration(format!(
                "{brand} prefix '{bad}' is not a digit string shorter than {shortest}"
            )));
        }

        Ok(BrandProfile {
            brand,
            prefixes,
            lengths: spec.lengths.to_vec(),
            cvv_length: spec.cvv_length,
            mask: spec.mask,
        })
    }
}

/// Expands `start..=end` into zero-padded strings of the range's width.
fn expand_range(brand: CardBrand, range: &PrefixRange) -> EngineResult<Vec<String>> {
    let width = range.start.to_string().len();

    if range.step == 0 || range.start > range.end || range.end.to_string().len() != width {
        return Err(EngineError::Configuration(format!(
            "{brand} has an invalid prefix range {range:?}"
        )));
    }

    Ok((range.start..=range.end)
        .step_by(range.step as usize)
        .map(|value| format!("{value:0width$}"))
        .collect())
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug, Clone)]
struct Candidate {
    prefix: String,
    profile: usize,
}

/// Immutable brand table with a longest-prefix-first lookup list.
#[derive(Debug, Clone)]
pub struct BrandRegistry {
    profiles: Vec<BrandProfile>,
    candidates: Vec<Candidate>,
}

impl BrandRegistry {
    /// Builds the registry from [`BRAND_TABLE`].
    pub fn new() -> EngineResult<Self> {
        Self::from_specs(BRAND_TABLE)
    }

    /// Builds a registry from an arbitrary table.
    ///
    /// ## Errors
    /// [`EngineError::Configuration`] for duplicate brands, empty prefix or
    /// length sets, malformed ranges, or prefixes too long for their lengths.
    pub fn from_specs(specs: &[BrandSpec]) -> EngineResult<Self> {
        let mut profiles: Vec<BrandProfile> = Vec::with_capacity(specs.len());

        for spec in specs {
            if profiles.iter().any(|p| p.brand == spec.brand) {
                return Err(EngineError::Configuration(format!(
                    "{} declared twice",
                    spec.brand
                )));
            }
            profiles.push(BrandProfile::from_spec(spec)?);
        }

        let mut candidates: Vec<Candidate> = profiles
            .iter()
            .enumerate()
            .flat_map(|(index, profile)| {
                profile.prefixes.iter().map(move |prefix| Candidate {
                    prefix: prefix.clone(),
                    profile: index,
                })
            })
            .collect();
        // Stable: equal-length prefixes keep registry order
        candidates.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        debug!(
            brands = profiles.len(),
            candidates = candidates.len(),
            "Brand registry built"
        );

        Ok(BrandRegistry {
            profiles,
            candidates,
        })
    }

    /// All profiles, in table order.
    pub fn profiles(&self) -> &[BrandProfile] {
        &self.profiles
    }

    /// Looks up a brand's profile.
    pub fn profile(&self, brand: CardBrand) -> Option<&BrandProfile> {
        self.profiles.iter().find(|p| p.brand == brand)
    }

    /// Resolves the brand of a bare digit string.
    ///
    /// Returns the brand of the longest matching prefix whose length set
    /// contains `digits.len()`, or `None`.
    pub fn identify(&self, digits: &str) -> Option<CardBrand> {
        let len = digits.len();
        self.candidates
            .iter()
            .map(|c| (c, &self.profiles[c.profile]))
            .find(|(c, profile)| digits.starts_with(c.prefix.as_str()) && profile.accepts_length(len))
            .map(|(_, profile)| profile.brand)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BrandRegistry {
        BrandRegistry::new().unwrap()
    }

    #[test]
    fn test_table_builds() {
        let registry = registry();
        assert_eq!(registry.profiles().len(), CardBrand::ALL.len());
        for brand in CardBrand::ALL {
            assert!(registry.profile(brand).is_some(), "{brand} missing");
        }
    }

    #[test]
    fn test_mastercard_ranges_expand() {
        let registry = registry();
        let mastercard = registry.profile(CardBrand::Mastercard).unwrap();
        assert_eq!(mastercard.prefixes.len(), 5 + 500);
        assert!(mastercard.prefixes.contains(&"51".to_string()));
        assert!(mastercard.prefixes.contains(&"2221".to_string()));
        assert!(mastercard.prefixes.contains(&"2720".to_string()));
        assert!(!mastercard.prefixes.contains(&"2721".to_string()));
    }

    #[test]
    fn test_identify_basic() {
        let registry = registry();
        assert_eq!(registry.identify("4111111111111111"), Some(CardBrand::Visa));
        assert_eq!(registry.identify("5500000000000004"), Some(CardBrand::Mastercard));
        assert_eq!(registry.identify("2221000000000009"), Some(CardBrand::Mastercard));
        assert_eq!(registry.identify("378282246310005"), Some(CardBrand::Amex));
        assert_eq!(registry.identify("30569309025904"), Some(CardBrand::Diners));
        assert_eq!(registry.identify("6011111111111117"), Some(CardBrand::Discover));
        assert_eq!(registry.identify("3530111333300000"), Some(CardBrand::Jcb));
        assert_eq!(registry.identify("6062825624254001"), Some(CardBrand::Hipercard));
    }

    #[test]
    fn test_identify_prefers_longest_prefix() {
        let registry = registry();
        // Elo's 401178 sits inside Visa's 4
        assert_eq!(registry.identify("4011781234567890"), Some(CardBrand::Elo));
        // Elo's 650031 sits inside Discover's 65
        assert_eq!(registry.identify("6500311234567890"), Some(CardBrand::Elo));
        // Elo's 504175 sits inside Aura's 50
        assert_eq!(registry.identify("5041751234567890"), Some(CardBrand::Elo));
        assert_eq!(registry.identify("5012341234567890"), Some(CardBrand::Aura));
    }

    #[test]
    fn test_identify_requires_allowed_length() {
        let registry = registry();
        // Elo is 16 digits only, so a 13-digit 401178 number falls back to Visa
        assert_eq!(registry.identify("4011781234567"), Some(CardBrand::Visa));
        // Amex is 15 digits only
        assert_eq!(registry.identify("3782822463100055"), None);
    }

    #[test]
    fn test_identify_is_total() {
        let registry = registry();
        for input in ["", "0", "9999999999999999", "1234567890123", "7"] {
            assert_eq!(registry.identify(input), None);
        }
    }

    #[test]
    fn test_rejects_empty_prefix_table() {
        let specs = [BrandSpec {
            brand: CardBrand::Visa,
            prefixes: &[],
            ranges: &[],
            lengths: &[16],
            cvv_length: 3,
            mask: SIXTEEN,
        }];
        assert!(matches!(
            BrandRegistry::from_specs(&specs),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_bad_ranges_and_lengths() {
        let zero_step = [BrandSpec {
            brand: CardBrand::Jcb,
            prefixes: &[],
            ranges: &[PrefixRange {
                start: 3528,
                end: 3589,
                step: 0,
            }],
            lengths: &[16],
            cvv_length: 3,
            mask: SIXTEEN,
        }];
        assert!(BrandRegistry::from_specs(&zero_step).is_err());

        let no_lengths = [BrandSpec {
            brand: CardBrand::Visa,
            prefixes: &["4"],
            ranges: &[],
            lengths: &[],
            cvv_length: 3,
            mask: SIXTEEN,
        }];
        assert!(BrandRegistry::from_specs(&no_lengths).is_err());

        let twice = [BRAND_TABLE[0], BRAND_TABLE[0]];
        assert!(BrandRegistry::from_specs(&twice).is_err());
    }
}
