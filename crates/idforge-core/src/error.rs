//! # Error Types
//!
//! Error types for idforge-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  Bad identifier data (NOT an error, returned as a value)               │
//! │  └── InvalidReason    - WrongLength, LuhnFailure, ... (types.rs)       │
//! │                                                                         │
//! │  idforge-core errors (this file)                                       │
//! │  ├── EngineError      - Unsupported brand, misconfigured registry      │
//! │  └── RequestError     - Batch caps, counts, unparseable parameters     │
//! │                                                                         │
//! │  Flow: RequestError → EngineError → caller (CLI prints it)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. A malformed identifier is never an `Err`; it is `ValidationOutcome::Invalid`
//! 3. `EngineError::Configuration` is the only programmer error

use thiserror::Error;

// =============================================================================
// Engine Error
// =============================================================================

/// Errors surfaced by the engines and the dispatcher.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Generation was requested for a brand the registry does not know.
    ///
    /// ## When This Occurs
    /// - Caller typed a brand name that is not in the table ("maestro")
    /// - A custom registry was built without the requested brand
    #[error("Unsupported card brand for generation: {name}")]
    UnsupportedBrandForGeneration { name: String },

    /// The brand registry is internally inconsistent.
    ///
    /// Empty prefix or length sets, a zero range step, or a generator that
    /// cannot produce a number its own registry identifies correctly.
    #[error("Brand registry misconfigured: {0}")]
    Configuration(String),

    /// Request parameter error (wraps RequestError).
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),
}

// =============================================================================
// Request Error
// =============================================================================

/// Request parameter errors.
///
/// These describe the request envelope (batch sizes, counts, options), not
/// the identifiers inside it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// A batch operation was given no inputs.
    #[error("{field} must not be empty")]
    EmptyBatch { field: String },

    /// A batch exceeds the per-kind cap.
    #[error("{field} has {actual} entries, at most {max} allowed")]
    BatchTooLarge {
        field: String,
        max: usize,
        actual: usize,
    },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Parameter could not be parsed.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
