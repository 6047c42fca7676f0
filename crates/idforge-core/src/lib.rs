//! # idforge-core: Pure Identifier Logic
//!
//! Validation and synthesis of checksum-protected identifiers used in
//! Brazilian commerce: CPF, CNPJ and payment-card numbers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        idforge Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Front-end (CLI, tool dispatcher, UI)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Request / Response (serde)             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ idforge-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │   cpf    │  │   cnpj   │  │   card   │  │   dispatch   │   │   │
//! │  │   │ 11 digit │  │ 14 digit │  │ registry │  │ Engine       │   │   │
//! │  │   │ mod 11   │  │ mod 11   │  │ Luhn     │  │ Request      │   │   │
//! │  │   └────┬─────┘  └────┬─────┘  └────┬─────┘  └──────────────┘   │   │
//! │  │        └─────────────┼─────────────┘                            │   │
//! │  │                ┌─────▼──────┐                                   │   │
//! │  │                │  checksum  │  weighted mod 11, Luhn            │   │
//! │  │                └────────────┘                                   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • RANDOMNESS AND CLOCK INJECTED           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`checksum`] - Mod-11 and Luhn primitives
//! - [`cpf`] / [`cnpj`] - Brazilian taxpayer IDs
//! - [`card`] - Card brands, Luhn numbers, CVV and expiry dates
//! - [`mask`] - `#`-template display masks
//! - [`dispatch`] - Closed request enum and the [`Engine`] facade
//! - [`report`] - Per-item outcomes and batch aggregates
//! - [`validation`] - Request parameter checks (batch caps, counts)
//!
//! ## Example Usage
//!
//! ```rust
//! use idforge_core::cpf::CpfEngine;
//! use idforge_core::{Validate, ValidationOutcome, InvalidReason};
//!
//! let cpf = CpfEngine::new();
//! assert_eq!(cpf.validate("111.444.777-35"), ValidationOutcome::Valid);
//! assert_eq!(
//!     cpf.validate("111.111.111-11"),
//!     ValidationOutcome::Invalid(InvalidReason::RepeatedDigitSequence)
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod card;
pub mod checksum;
pub mod cnpj;
pub mod cpf;
pub mod dispatch;
pub mod error;
pub mod mask;
pub mod report;
pub mod traits;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use dispatch::{Engine, Request, Response};
pub use error::{EngineError, EngineResult, RequestError};
pub use traits::{Format, Generate, Identify, Validate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum identifiers per CPF/CNPJ request (inputs or generated count).
pub const MAX_DOCUMENT_BATCH: usize = 100;

/// Maximum card numbers per request (inputs or generated count).
pub const MAX_CARD_BATCH: usize = 50;

/// Default span, in years, for future expiry dates.
pub const DEFAULT_EXPIRY_FUTURE_YEARS: u32 = 5;

/// Default span, in years, for past expiry dates.
pub const DEFAULT_EXPIRY_PAST_YEARS: u32 = 5;

/// Longest span, in years, an expiry policy may reach on either side of today.
pub const MAX_EXPIRY_SPAN_YEARS: u32 = 50;
