//! Capabilities shared by the identifier engines.
//!
//! ```text
//!               Validate   Format   Identify   Generate
//!  CpfEngine       ✓          ✓        ✓ region    ✓
//!  CnpjEngine      ✓          ✓        ✓ branch    ✓
//!  CardEngine      ✓          ✓        ✓ brand     ✓ (per brand)
//! ```
//!
//! The dispatcher is generic over these traits, so the CPF and CNPJ request
//! paths share one implementation.

use rand::Rng;

use crate::error::EngineResult;
use crate::types::{InvalidReason, MaskMode, ValidationOutcome};

/// Checks an identifier, ignoring separators.
pub trait Validate {
    fn validate(&self, input: &str) -> ValidationOutcome;
}

/// Renders an identifier for display.
pub trait Format {
    /// Formats `input` in `mask` mode.
    ///
    /// Only the digit count is checked; an identifier with wrong check digits
    /// still formats. The digit sequence is never altered.
    fn format(&self, input: &str, mask: MaskMode) -> Result<String, InvalidReason>;
}

/// Extracts what an identifier says about its holder or issuer.
pub trait Identify {
    type Identity;

    fn identify(&self, input: &str) -> Result<Self::Identity, InvalidReason>;
}

/// Synthesizes identifiers that pass [`Validate`].
pub trait Generate {
    type Options;
    type Output;

    fn generate<R: Rng + ?Sized>(
        &self,
        options: &Self::Options,
        rng: &mut R,
    ) -> EngineResult<Self::Output>;
}
