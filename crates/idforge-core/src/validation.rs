//! # Validation Module
//!
//! Request parameter validation for idforge.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front-end (CLI / tool schema)                                │
//! │  ├── Argument types (clap / serde deserialization)                     │
//! │  └── Immediate usage errors                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Batch caps (100 documents, 50 cards)                              │
//! │  └── Counts, region digits, expiry spans                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engines                                                      │
//! │  └── Per-identifier outcome (never an error)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use idforge_core::validation::{validate_batch, validate_count};
//!
//! validate_batch(3, 100, "inputs").unwrap();
//! assert!(validate_count(0, 50).is_err());
//! ```

use crate::error::RequestError;
use crate::MAX_EXPIRY_SPAN_YEARS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, RequestError>;

// =============================================================================
// Batch Validators
// =============================================================================

/// Validates the size of an input batch.
///
/// ## Rules
/// - Must not be empty
/// - Must not exceed `max`
pub fn validate_batch(len: usize, max: usize, field: &str) -> ValidationResult<()> {
    if len == 0 {
        return Err(RequestError::EmptyBatch {
            field: field.to_string(),
        });
    }

    if len > max {
        return Err(RequestError::BatchTooLarge {
            field: field.to_string(),
            max,
            actual: len,
        });
    }

    Ok(())
}

/// Validates how many identifiers a generate request asks for.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed `max`
pub fn validate_count(count: usize, max: usize) -> ValidationResult<()> {
    if count == 0 || count > max {
        return Err(RequestError::OutOfRange {
            field: "count".to_string(),
            min: 1,
            max: max as i64,
        });
    }

    Ok(())
}

/// Validates a configured batch limit against its hard cap.
pub fn validate_limit(limit: usize, hard_cap: usize, field: &str) -> ValidationResult<()> {
    if limit == 0 || limit > hard_cap {
        return Err(RequestError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: hard_cap as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Option Validators
// =============================================================================

/// Validates a CPF fiscal region digit.
///
/// ## Example
/// ```rust
/// use idforge_core::validation::validate_region;
///
/// assert!(validate_region(8).is_ok());
/// assert!(validate_region(10).is_err());
/// ```
pub fn validate_region(region: u8) -> ValidationResult<()> {
    if region > 9 {
        return Err(RequestError::OutOfRange {
            field: "region".to_string(),
            min: 0,
            max: 9,
        });
    }

    Ok(())
}

/// Validates how many years an expiry policy reaches past or ahead of today.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_EXPIRY_SPAN_YEARS`]
pub fn validate_expiry_span(years: u32, field: &str) -> ValidationResult<()> {
    if years == 0 || years > MAX_EXPIRY_SPAN_YEARS {
        return Err(RequestError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: i64::from(MAX_EXPIRY_SPAN_YEARS),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_batch() {
        assert!(validate_batch(1, 100, "inputs").is_ok());
        assert!(validate_batch(100, 100, "inputs").is_ok());

        assert_eq!(
            validate_batch(0, 100, "inputs"),
            Err(RequestError::EmptyBatch {
                field: "inputs".to_string()
            })
        );
        assert!(matches!(
            validate_batch(51, 50, "inputs"),
            Err(RequestError::BatchTooLarge { actual: 51, .. })
        ));
    }

    #[test]
    fn test_validate_count() {
        assert!(validate_count(1, 50).is_ok());
        assert!(validate_count(50, 50).is_ok());
        assert!(validate_count(0, 50).is_err());
        assert!(validate_count(51, 50).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(10, 100, "max_document_batch").is_ok());
        assert!(validate_limit(0, 100, "max_document_batch").is_err());
        assert!(validate_limit(101, 100, "max_document_batch").is_err());
    }

    #[test]
    fn test_validate_region() {
        for region in 0..=9 {
            assert!(validate_region(region).is_ok());
        }
        assert!(validate_region(10).is_err());
    }

    #[test]
    fn test_validate_expiry_span() {
        assert!(validate_expiry_span(1, "max_future_years").is_ok());
        assert!(validate_expiry_span(MAX_EXPIRY_SPAN_YEARS, "max_future_years").is_ok());

        assert_eq!(
            validate_expiry_span(u32::MAX, "max_future_years"),
            Err(RequestError::OutOfRange {
                field: "max_future_years".to_string(),
                min: 1,
                max: 50,
            })
        );
        assert!(validate_expiry_span(0, "max_past_years").is_err());
        assert!(validate_expiry_span(MAX_EXPIRY_SPAN_YEARS + 1, "max_past_years").is_err());
    }
}
