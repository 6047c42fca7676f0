//! # Reports
//!
//! Batch results returned by the [`Engine`](crate::Engine).
//!
//! ```text
//! ┌────────────────────────┐     ┌──────────────────────────────────────┐
//! │ inputs: [a, b, c]      │ ──▶ │ items:   [a: Valid, b: Invalid, c..] │
//! └────────────────────────┘     │ summary: total 3, valid 2, invalid 1 │
//!                                │ brand_counts (cards only)            │
//!                                └──────────────────────────────────────┘
//! ```
//!
//! Items always come back in input order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::card::{CardBrand, GeneratedCard};
use crate::cnpj::Establishment;
use crate::cpf::FiscalRegion;
use crate::types::{DocumentKind, GeneratedIdentifier, InvalidReason, ValidationOutcome};

/// Count of identifiers per card brand.
pub type BrandCounts = BTreeMap<CardBrand, usize>;

/// Tallies brands, skipping unidentified entries.
pub fn count_brands(brands: impl IntoIterator<Item = Option<CardBrand>>) -> BrandCounts {
    let mut counts = BrandCounts::new();
    for brand in brands.into_iter().flatten() {
        *counts.entry(brand).or_default() += 1;
    }
    counts
}

// =============================================================================
// Summary
// =============================================================================

/// Aggregate outcome counts for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Summary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl Summary {
    /// Counts outcomes.
    ///
    /// ## Example
    /// ```rust
    /// use idforge_core::report::Summary;
    /// use idforge_core::{InvalidReason, ValidationOutcome};
    ///
    /// let outcomes = [
    ///     ValidationOutcome::Valid,
    ///     ValidationOutcome::Invalid(InvalidReason::WrongLength),
    /// ];
    /// let summary = Summary::tally(&outcomes);
    /// assert_eq!((summary.total, summary.valid, summary.invalid), (2, 1, 1));
    /// ```
    pub fn tally<'a>(outcomes: impl IntoIterator<Item = &'a ValidationOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Summary::default(), |mut summary, outcome| {
                summary.total += 1;
                if outcome.is_valid() {
                    summary.valid += 1;
                } else {
                    summary.invalid += 1;
                }
                summary
            })
    }
}

// =============================================================================
// Validate
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationItem {
    /// The input exactly as received.
    pub input: String,
    pub outcome: ValidationOutcome,
    /// Set for valid card numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<CardBrand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationReport {
    pub kind: DocumentKind,
    pub items: Vec<ValidationItem>,
    pub summary: Summary,
    /// Valid card numbers per brand; absent for CPF and CNPJ.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_counts: Option<BrandCounts>,
}

impl ValidationReport {
    pub fn new(kind: DocumentKind, items: Vec<ValidationItem>) -> Self {
        let summary = Summary::tally(items.iter().map(|item| &item.outcome));
        let brand_counts = (kind == DocumentKind::Card)
            .then(|| count_brands(items.iter().map(|item| item.brand)));

        ValidationReport {
            kind,
            items,
            summary,
            brand_counts,
        }
    }
}

// =============================================================================
// Format
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormatItem {
    pub input: String,
    /// `None` when the digit count is wrong for the kind.
    pub formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidReason>,
}

impl FormatItem {
    pub fn from_result(input: String, result: Result<String, InvalidReason>) -> Self {
        match result {
            Ok(formatted) => FormatItem {
                input,
                formatted: Some(formatted),
                reason: None,
            },
            Err(reason) => FormatItem {
                input,
                formatted: None,
                reason: Some(reason),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormatReport {
    pub kind: DocumentKind,
    pub items: Vec<FormatItem>,
    /// Items that could not be formatted.
    pub rejected: usize,
}

impl FormatReport {
    pub fn new(kind: DocumentKind, items: Vec<FormatItem>) -> Self {
        let rejected = items.iter().filter(|item| item.formatted.is_none()).count();
        FormatReport {
            kind,
            items,
            rejected,
        }
    }
}

// =============================================================================
// Identify
// =============================================================================

/// What an identifier reveals, by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IdentityDetails {
    Region(FiscalRegion),
    Establishment(Establishment),
    Brand { brand: CardBrand },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IdentifyItem {
    pub input: String,
    pub outcome: ValidationOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<IdentityDetails>,
}

impl IdentifyItem {
    pub fn from_result<T>(input: String, result: Result<T, InvalidReason>) -> Self
    where
        T: Into<IdentityDetails>,
    {
        match result {
            Ok(identity) => IdentifyItem {
                input,
                outcome: ValidationOutcome::Valid,
                details: Some(identity.into()),
            },
            Err(reason) => IdentifyItem {
                input,
                outcome: ValidationOutcome::Invalid(reason),
                details: None,
            },
        }
    }
}

impl From<FiscalRegion> for IdentityDetails {
    fn from(region: FiscalRegion) -> Self {
        IdentityDetails::Region(region)
    }
}

impl From<Establishment> for IdentityDetails {
    fn from(establishment: Establishment) -> Self {
        IdentityDetails::Establishment(establishment)
    }
}

impl From<CardBrand> for IdentityDetails {
    fn from(brand: CardBrand) -> Self {
        IdentityDetails::Brand { brand }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IdentifyReport {
    pub kind: DocumentKind,
    pub items: Vec<IdentifyItem>,
    pub summary: Summary,
    /// Identified card numbers per brand; absent for CPF and CNPJ.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_counts: Option<BrandCounts>,
}

impl IdentifyReport {
    pub fn new(kind: DocumentKind, items: Vec<IdentifyItem>) -> Self {
        let summary = Summary::tally(items.iter().map(|item| &item.outcome));
        let brand_counts = (kind == DocumentKind::Card).then(|| {
            count_brands(items.iter().map(|item| match item.details {
                Some(IdentityDetails::Brand { brand }) => Some(brand),
                _ => None,
            }))
        });

        IdentifyReport {
            kind,
            items,
            summary,
            brand_counts,
        }
    }
}

// =============================================================================
// Generate
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GenerateReport {
    pub kind: DocumentKind,
    pub items: Vec<GeneratedIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CardGenerateReport {
    pub items: Vec<GeneratedCard>,
    pub brand_counts: BrandCounts,
}

impl CardGenerateReport {
    pub fn new(items: Vec<GeneratedCard>) -> Self {
        let brand_counts = count_brands(items.iter().map(|card| Some(card.brand)));
        CardGenerateReport {
            items,
            brand_counts,
        }
    }
}

// =============================================================================
// Expiry
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpiryItem {
    pub input: String,
    /// `None` when the date is not `MM/YY`, `MM/YYYY` or `YYYY-MM`.
    pub expired: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpiryReport {
    pub items: Vec<ExpiryItem>,
    pub expired: usize,
    pub unparseable: usize,
}

impl ExpiryReport {
    pub fn new(items: Vec<ExpiryItem>) -> Self {
        let expired = items.iter().filter(|i| i.expired == Some(true)).count();
        let unparseable = items.iter().filter(|i| i.expired.is_none()).count();
        ExpiryReport {
            items,
            expired,
            unparseable,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(input: &str, outcome: ValidationOutcome, brand: Option<CardBrand>) -> ValidationItem {
        ValidationItem {
            input: input.to_string(),
            outcome,
            brand,
        }
    }

    #[test]
    fn test_summary_tally() {
        let outcomes = [
            ValidationOutcome::Valid,
            ValidationOutcome::Invalid(InvalidReason::LuhnFailure),
            ValidationOutcome::Valid,
        ];
        assert_eq!(
            Summary::tally(&outcomes),
            Summary {
                total: 3,
                valid: 2,
                invalid: 1
            }
        );
        assert_eq!(Summary::tally(&[]), Summary::default());
    }

    #[test]
    fn test_validation_report_brand_counts() {
        let report = ValidationReport::new(
            DocumentKind::Card,
            vec![
                item("4111111111111111", ValidationOutcome::Valid, Some(CardBrand::Visa)),
                item("4012888888881881", ValidationOutcome::Valid, Some(CardBrand::Visa)),
                item(
                    "4111111111111112",
                    ValidationOutcome::Invalid(InvalidReason::LuhnFailure),
                    None,
                ),
            ],
        );

        assert_eq!(report.summary.valid, 2);
        let counts = report.brand_counts.unwrap();
        assert_eq!(counts.get(&CardBrand::Visa), Some(&2));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_document_reports_omit_brand_counts() {
        let report = ValidationReport::new(
            DocumentKind::Cpf,
            vec![item("111.444.777-35", ValidationOutcome::Valid, None)],
        );
        assert!(report.brand_counts.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("brand_counts").is_none());
        assert_eq!(json["kind"], "cpf");
    }

    #[test]
    fn test_identity_details_serialization() {
        let details = IdentityDetails::from(CardBrand::Elo);
        assert_eq!(
            serde_json::to_value(&details).unwrap(),
            serde_json::json!({"type": "brand", "brand": "elo"})
        );

        let details = IdentityDetails::from(Establishment {
            root: "11222333".to_string(),
            branch: "0001".to_string(),
            headquarters: true,
        });
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["type"], "establishment");
        assert_eq!(json["headquarters"], true);
    }

    #[test]
    fn test_format_report_counts_rejections() {
        let report = FormatReport::new(
            DocumentKind::Cnpj,
            vec![
                FormatItem::from_result("1".to_string(), Err(InvalidReason::WrongLength)),
                FormatItem::from_result(
                    "11222333000181".to_string(),
                    Ok("11.222.333/0001-81".to_string()),
                ),
            ],
        );
        assert_eq!(report.rejected, 1);
        assert_eq!(report.items[0].reason, Some(InvalidReason::WrongLength));
    }
}
