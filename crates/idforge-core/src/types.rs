//! # Domain Types
//!
//! Shared value types used by every identifier engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────────┐  ┌───────────────────┐  ┌──────────────────┐    │
//! │  │ ValidationOutcome │  │   InvalidReason   │  │  DocumentKind    │    │
//! │  │  ───────────────  │  │  ───────────────  │  │  ──────────────  │    │
//! │  │  Valid            │  │  WrongLength      │  │  Cpf             │    │
//! │  │  Invalid(reason)──┼─►│  RepeatedDigits   │  │  Cnpj            │    │
//! │  └───────────────────┘  │  CheckDigit...    │  │  Card            │    │
//! │                         │  LuhnFailure      │  └──────────────────┘    │
//! │  ┌───────────────────┐  │  UnidentifiedBrand│                          │
//! │  │GeneratedIdentifier│  └───────────────────┘  ┌──────────────────┐    │
//! │  │  digits           │                         │    MaskMode      │    │
//! │  │  display          │                         │  Masked/Unmasked │    │
//! │  └───────────────────┘                         └──────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Invalid Reason
// =============================================================================

/// Why an identifier failed validation.
///
/// Closed set. Request-level problems live in
/// [`RequestError`](crate::error::RequestError) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// Digit count does not match the identifier kind (or any brand length).
    WrongLength,
    /// Every digit is the same (CPF/CNPJ only).
    RepeatedDigitSequence,
    /// A computed mod-11 check digit differs from the supplied one.
    CheckDigitMismatch,
    /// The card number fails the Luhn checksum.
    LuhnFailure,
    /// No brand prefix/length combination matches.
    UnidentifiedBrand,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            InvalidReason::WrongLength => "wrong number of digits",
            InvalidReason::RepeatedDigitSequence => "all digits are identical",
            InvalidReason::CheckDigitMismatch => "check digits do not match",
            InvalidReason::LuhnFailure => "Luhn checksum failed",
            InvalidReason::UnidentifiedBrand => "card brand not recognized",
        };
        f.write_str(message)
    }
}

// =============================================================================
// Validation Outcome
// =============================================================================

/// Result of validating one identifier.
///
/// ## Serialization
/// ```json
/// { "status": "valid" }
/// { "status": "invalid", "reason": "luhn_failure" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    Invalid(InvalidReason),
}

impl ValidationOutcome {
    /// Returns true for [`ValidationOutcome::Valid`].
    #[inline]
    pub const fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Returns the failure reason, if any.
    #[inline]
    pub const fn reason(&self) -> Option<InvalidReason> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(reason) => Some(*reason),
        }
    }
}

impl<T> From<Result<T, InvalidReason>> for ValidationOutcome {
    fn from(result: Result<T, InvalidReason>) -> Self {
        match result {
            Ok(_) => ValidationOutcome::Valid,
            Err(reason) => ValidationOutcome::Invalid(reason),
        }
    }
}

// =============================================================================
// Document Kind
// =============================================================================

/// The identifier family a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Individual taxpayer ID (11 digits).
    Cpf,
    /// Legal-entity taxpayer ID (14 digits).
    Cnpj,
    /// Payment card number (13-19 digits).
    Card,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Cpf => write!(f, "cpf"),
            DocumentKind::Cnpj => write!(f, "cnpj"),
            DocumentKind::Card => write!(f, "card"),
        }
    }
}

// =============================================================================
// Mask Mode
// =============================================================================

/// Presentation of a formatted identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MaskMode {
    /// Punctuated display form (`111.444.777-35`).
    #[default]
    Masked,
    /// Bare digits (`11144477735`).
    Unmasked,
}

impl MaskMode {
    /// Maps a `with_mask` flag onto a mode.
    #[inline]
    pub const fn from_flag(with_mask: bool) -> Self {
        if with_mask {
            MaskMode::Masked
        } else {
            MaskMode::Unmasked
        }
    }
}

// =============================================================================
// Generated Identifier
// =============================================================================

/// A synthetic CPF or CNPJ.
///
/// `digits` always passes the validator of the engine that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeneratedIdentifier {
    /// Bare digits including the check digits.
    pub digits: String,
    /// `digits` rendered in the requested [`MaskMode`].
    pub display: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let ok: Result<(), InvalidReason> = Ok(());
        assert_eq!(ValidationOutcome::from(ok), ValidationOutcome::Valid);

        let err: Result<(), InvalidReason> = Err(InvalidReason::LuhnFailure);
        let outcome = ValidationOutcome::from(err);
        assert!(!outcome.is_valid());
        assert_eq!(outcome.reason(), Some(InvalidReason::LuhnFailure));
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&ValidationOutcome::Valid).unwrap();
        assert_eq!(json, r#"{"status":"valid"}"#);

        let json = serde_json::to_string(&ValidationOutcome::Invalid(
            InvalidReason::RepeatedDigitSequence,
        ))
        .unwrap();
        assert_eq!(
            json,
            r#"{"status":"invalid","reason":"repeated_digit_sequence"}"#
        );
    }

    #[test]
    fn test_mask_mode_default() {
        assert_eq!(MaskMode::default(), MaskMode::Masked);
        assert_eq!(MaskMode::from_flag(false), MaskMode::Unmasked);
    }
}
