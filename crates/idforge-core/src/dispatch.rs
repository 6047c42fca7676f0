//! # Request Dispatch
//!
//! A closed request enum and the [`Engine`] facade that answers it.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request::Cpf(Validate { inputs })                                      │
//! │       │                                                                 │
//! │       ├── validate_batch(inputs, limits.max_document_batch)   ← caps   │
//! │       │        └── Err(RequestError) → EngineError::Request            │
//! │       │                                                                 │
//! │       ├── per input: CpfEngine::validate          ← never an Err       │
//! │       │                                                                 │
//! │       └── Response::Validate(ValidationReport)    ← input order kept   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! CPF and CNPJ share one generic path over the capability traits; cards add
//! brand counts, brand selection, CVV and expiry.
//!
//! ## Wire Shape
//! ```json
//! {"kind": "cnpj", "operation": "generate", "count": 2, "options": {"branch": "random"}}
//! {"kind": "card", "operation": "generate", "count": 5, "brand": "elo", "include_cvv": true}
//! ```

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::card::{BrandSelection, CardBrand, CardEngine, CardOptions, ExpiryPolicy};
use crate::cnpj::{CnpjEngine, CnpjOptions};
use crate::cpf::{CpfEngine, CpfOptions};
use crate::error::{EngineError, EngineResult};
use crate::report::{
    CardGenerateReport, ExpiryItem, ExpiryReport, FormatItem, FormatReport, GenerateReport,
    IdentifyItem, IdentifyReport, IdentityDetails, ValidationItem, ValidationReport,
};
use crate::traits::{Format, Generate, Identify, Validate};
use crate::types::{DocumentKind, GeneratedIdentifier, MaskMode};
use crate::validation::{
    validate_batch, validate_count, validate_expiry_span, validate_limit, ValidationResult,
};
use crate::{MAX_CARD_BATCH, MAX_DOCUMENT_BATCH};

fn default_count() -> usize {
    1
}

// =============================================================================
// Requests
// =============================================================================

/// Every operation the engine answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    Cpf(DocumentRequest<CpfOptions>),
    Cnpj(DocumentRequest<CnpjOptions>),
    Card(CardRequest),
}

impl Request {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Request::Cpf(_) => DocumentKind::Cpf,
            Request::Cnpj(_) => DocumentKind::Cnpj,
            Request::Card(_) => DocumentKind::Card,
        }
    }
}

/// CPF or CNPJ operation; `O` carries the kind's generation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "operation",
    rename_all = "snake_case",
    bound(
        serialize = "O: Serialize",
        deserialize = "O: Deserialize<'de> + Default"
    )
)]
pub enum DocumentRequest<O> {
    Validate {
        inputs: Vec<String>,
    },
    Format {
        inputs: Vec<String>,
        #[serde(default)]
        mask: MaskMode,
    },
    Identify {
        inputs: Vec<String>,
    },
    Generate {
        #[serde(default = "default_count")]
        count: usize,
        #[serde(default)]
        options: O,
    },
}

/// Card operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum CardRequest {
    Validate {
        inputs: Vec<String>,
    },
    Format {
        inputs: Vec<String>,
        #[serde(default)]
        mask: MaskMode,
    },
    Identify {
        inputs: Vec<String>,
    },
    Generate {
        #[serde(default = "default_count")]
        count: usize,
        #[serde(default)]
        brand: BrandSelection,
        #[serde(default)]
        mask: MaskMode,
        #[serde(default)]
        include_cvv: bool,
        /// Attach an expiry date to every card.
        #[serde(default)]
        expiry: Option<ExpiryPolicy>,
    },
    /// Checks expiry dates against today.
    Expiry {
        inputs: Vec<String>,
    },
}

// =============================================================================
// Response
// =============================================================================

/// The report for a [`Request`], tagged by operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Response {
    Validate(ValidationReport),
    Format(FormatReport),
    Identify(IdentifyReport),
    Generate(GenerateReport),
    GenerateCards(CardGenerateReport),
    Expiry(ExpiryReport),
}

// =============================================================================
// Limits
// =============================================================================

/// Per-kind batch caps. Neither may exceed the crate's hard caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_document_batch: usize,
    pub max_card_batch: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_document_batch: MAX_DOCUMENT_BATCH,
            max_card_batch: MAX_CARD_BATCH,
        }
    }
}

impl Limits {
    /// Builds limits, rejecting zero or anything above the hard caps.
    pub fn new(max_document_batch: usize, max_card_batch: usize) -> ValidationResult<Self> {
        validate_limit(max_document_batch, MAX_DOCUMENT_BATCH, "max_document_batch")?;
        validate_limit(max_card_batch, MAX_CARD_BATCH, "max_card_batch")?;

        Ok(Limits {
            max_document_batch,
            max_card_batch,
        })
    }

    fn for_kind(&self, kind: DocumentKind) -> usize {
        match kind {
            DocumentKind::Cpf | DocumentKind::Cnpj => self.max_document_batch,
            DocumentKind::Card => self.max_card_batch,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Facade over the three identifier engines.
///
/// Owns the brand registry, so build it once and reuse it.
#[derive(Debug, Clone)]
pub struct Engine {
    cpf: CpfEngine,
    cnpj: CnpjEngine,
    card: CardEngine,
    limits: Limits,
}

impl Engine {
    pub fn new() -> EngineResult<Self> {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> EngineResult<Self> {
        Ok(Engine {
            cpf: CpfEngine::new(),
            cnpj: CnpjEngine::new(),
            card: CardEngine::new()?,
            limits,
        })
    }

    pub fn cpf(&self) -> &CpfEngine {
        &self.cpf
    }

    pub fn cnpj(&self) -> &CnpjEngine {
        &self.cnpj
    }

    pub fn card(&self) -> &CardEngine {
        &self.card
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Answers `request`.
    ///
    /// `today` drives card expiry; `rng` drives every generator.
    ///
    /// ## Errors
    /// - [`EngineError::Request`] for empty or oversized batches and bad counts
    /// - [`EngineError::UnsupportedBrandForGeneration`] for unknown brands
    /// - [`EngineError::Configuration`] if the registry cannot satisfy a brand
    pub fn handle<R: Rng + ?Sized>(
        &self,
        request: Request,
        today: NaiveDate,
        rng: &mut R,
    ) -> EngineResult<Response> {
        let kind = request.kind();
        let result = match request {
            Request::Cpf(request) => self.handle_document(kind, &self.cpf, request, rng),
            Request::Cnpj(request) => self.handle_document(kind, &self.cnpj, request, rng),
            Request::Card(request) => self.handle_card(request, today, rng),
        };

        if let Err(error) = &result {
            warn!(%kind, %error, "Request rejected");
        }
        result
    }

    fn handle_document<E, R>(
        &self,
        kind: DocumentKind,
        engine: &E,
        request: DocumentRequest<E::Options>,
        rng: &mut R,
    ) -> EngineResult<Response>
    where
        E: Validate + Format + Identify + Generate<Output = GeneratedIdentifier>,
        E::Identity: Into<IdentityDetails>,
        R: Rng + ?Sized,
    {
        let max = self.limits.for_kind(kind);

        match request {
            DocumentRequest::Validate { inputs } => {
                validate_batch(inputs.len(), max, "inputs")?;
                debug!(%kind, items = inputs.len(), "Validating");

                let items = inputs
                    .into_iter()
                    .map(|input| ValidationItem {
                        outcome: engine.validate(&input),
                        input,
                        brand: None,
                    })
                    .collect();
                Ok(Response::Validate(ValidationReport::new(kind, items)))
            }
            DocumentRequest::Format { inputs, mask } => {
                validate_batch(inputs.len(), max, "inputs")?;
                debug!(%kind, items = inputs.len(), ?mask, "Formatting");

                let items = inputs
                    .into_iter()
                    .map(|input| {
                        let result = engine.format(&input, mask);
                        FormatItem::from_result(input, result)
                    })
                    .collect();
                Ok(Response::Format(FormatReport::new(kind, items)))
            }
            DocumentRequest::Identify { inputs } => {
                validate_batch(inputs.len(), max, "inputs")?;
                debug!(%kind, items = inputs.len(), "Identifying");

                let items = inputs
                    .into_iter()
                    .map(|input| {
                        let result = engine.identify(&input);
                        IdentifyItem::from_result(input, result)
                    })
                    .collect();
                Ok(Response::Identify(IdentifyReport::new(kind, items)))
            }
            DocumentRequest::Generate { count, options } => {
                validate_count(count, max)?;
                debug!(%kind, count, "Generating");

                let items = (0..count)
                    .map(|_| engine.generate(&options, rng))
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(Response::Generate(GenerateReport { kind, items }))
            }
        }
    }

    fn handle_card<R: Rng + ?Sized>(
        &self,
        request: CardRequest,
        today: NaiveDate,
        rng: &mut R,
    ) -> EngineResult<Response> {
        let kind = DocumentKind::Card;
        let max = self.limits.max_card_batch;

        match request {
            CardRequest::Validate { inputs } => {
                validate_batch(inputs.len(), max, "inputs")?;
                debug!(%kind, items = inputs.len(), "Validating");

                let items = inputs
                    .into_iter()
                    .map(|input| {
                        let (outcome, brand) = self.card.validate_with_brand(&input);
                        ValidationItem {
                            input,
                            outcome,
                            brand,
                        }
                    })
                    .collect();
                Ok(Response::Validate(ValidationReport::new(kind, items)))
            }
            CardRequest::Format { inputs, mask } => {
                validate_batch(inputs.len(), max, "inputs")?;
                debug!(%kind, items = inputs.len(), ?mask, "Formatting");

                let items = inputs
                    .into_iter()
                    .map(|input| {
                        let result = self.card.format(&input, mask);
                        FormatItem::from_result(input, result)
                    })
                    .collect();
                Ok(Response::Format(FormatReport::new(kind, items)))
            }
            CardRequest::Identify { inputs } => {
                validate_batch(inputs.len(), max, "inputs")?;
                debug!(%kind, items = inputs.len(), "Identifying");

                let items = inputs
                    .into_iter()
                    .map(|input| {
                        let result = self.card.identify(&input);
                        IdentifyItem::from_result(input, result)
                    })
                    .collect();
                Ok(Response::Identify(IdentifyReport::new(kind, items)))
            }
            CardRequest::Generate {
                count,
                brand,
                mask,
                include_cvv,
                expiry,
            } => {
                validate_count(count, max)?;
                if let Some(policy) = &expiry {
                    validate_expiry_span(policy.max_future_years, "max_future_years")?;
                    validate_expiry_span(policy.max_past_years, "max_past_years")?;
                }
                debug!(%kind, count, ?brand, include_cvv, "Generating");

                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    let options = CardOptions {
                        brand: self.resolve_brand(&brand, rng)?,
                        mask,
                        include_cvv,
                        expiry,
                        today,
                    };
                    items.push(self.card.generate(&options, rng)?);
                }
                Ok(Response::GenerateCards(CardGenerateReport::new(items)))
            }
            CardRequest::Expiry { inputs } => {
                validate_batch(inputs.len(), max, "inputs")?;
                debug!(%kind, items = inputs.len(), %today, "Checking expiry");

                let items = inputs
                    .into_iter()
                    .map(|input| ExpiryItem {
                        expired: self.card.is_expired(&input, today),
                        input,
                    })
                    .collect();
                Ok(Response::Expiry(ExpiryReport::new(items)))
            }
        }
    }

    /// Picks a concrete brand; `Any` draws one per call and unknown names are
    /// rejected.
    fn resolve_brand<R: Rng + ?Sized>(
        &self,
        selection: &BrandSelection,
        rng: &mut R,
    ) -> EngineResult<CardBrand> {
        match selection.brand()? {
            Some(brand) => Ok(brand),
            None => self
                .card
                .registry()
                .profiles()
                .choose(rng)
                .map(|profile| profile.brand)
                .ok_or_else(|| EngineError::Configuration("registry has no brands".to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::ExpiryKind;
    use crate::error::RequestError;
    use crate::types::{InvalidReason, ValidationOutcome};
    use crate::MAX_EXPIRY_SPAN_YEARS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn handle(request: Request) -> EngineResult<Response> {
        let mut rng = StdRng::seed_from_u64(2024);
        Engine::new().unwrap().handle(request, today(), &mut rng)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cpf_validate_preserves_order() {
        let response = handle(Request::Cpf(DocumentRequest::Validate {
            inputs: strings(&["111.444.777-35", "111.111.111-11", "123"]),
        }))
        .unwrap();

        let Response::Validate(report) = response else {
            panic!("expected validate report");
        };
        let outcomes: Vec<_> = report.items.iter().map(|i| i.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                ValidationOutcome::Valid,
                ValidationOutcome::Invalid(InvalidReason::RepeatedDigitSequence),
                ValidationOutcome::Invalid(InvalidReason::WrongLength),
            ]
        );
        assert_eq!(report.items[2].input, "123");
        assert_eq!(report.summary.valid, 1);
        assert!(report.brand_counts.is_none());
    }

    #[test]
    fn test_batch_caps() {
        let too_many = vec!["11144477735".to_string(); MAX_DOCUMENT_BATCH + 1];
        assert!(matches!(
            handle(Request::Cnpj(DocumentRequest::Validate { inputs: too_many })),
            Err(EngineError::Request(RequestError::BatchTooLarge { max: 100, .. }))
        ));

        assert!(matches!(
            handle(Request::Card(CardRequest::Generate {
                count: MAX_CARD_BATCH + 1,
                brand: BrandSelection::Any,
                mask: MaskMode::Masked,
                include_cvv: false,
                expiry: None,
            })),
            Err(EngineError::Request(RequestError::OutOfRange { .. }))
        ));

        assert!(matches!(
            handle(Request::Cpf(DocumentRequest::Identify { inputs: vec![] })),
            Err(EngineError::Request(RequestError::EmptyBatch { .. }))
        ));
    }

    #[test]
    fn test_custom_limits() {
        assert!(Limits::new(0, 10).is_err());
        assert!(Limits::new(100, 51).is_err());

        let engine = Engine::with_limits(Limits::new(2, 2).unwrap()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let request = Request::Cpf(DocumentRequest::Generate {
            count: 3,
            options: CpfOptions::default(),
        });
        assert!(engine.handle(request, today(), &mut rng).is_err());
    }

    #[test]
    fn test_cnpj_generate_and_identify() {
        let response = handle(Request::Cnpj(DocumentRequest::Generate {
            count: 10,
            options: CnpjOptions::default(),
        }))
        .unwrap();
        let Response::Generate(report) = response else {
            panic!("expected generate report");
        };
        assert_eq!(report.items.len(), 10);
        assert_eq!(report.kind, DocumentKind::Cnpj);

        let inputs = report.items.into_iter().map(|g| g.display).collect();
        let Response::Identify(report) =
            handle(Request::Cnpj(DocumentRequest::Identify { inputs })).unwrap()
        else {
            panic!("expected identify report");
        };
        assert_eq!(report.summary.valid, 10);
        assert!(report.items.iter().all(|item| matches!(
            item.details,
            Some(IdentityDetails::Establishment(ref e)) if e.headquarters
        )));
    }

    #[test]
    fn test_card_validate_counts_brands() {
        let Response::Validate(report) = handle(Request::Card(CardRequest::Validate {
            inputs: strings(&["4111111111111111", "5555555555554444", "4111111111111112"]),
        }))
        .unwrap() else {
            panic!("expected validate report");
        };

        assert_eq!(report.items[0].brand, Some(CardBrand::Visa));
        assert_eq!(report.items[1].brand, Some(CardBrand::Mastercard));
        assert_eq!(report.summary.invalid, 1);
        let counts = report.brand_counts.unwrap();
        assert_eq!(counts.get(&CardBrand::Visa), Some(&1));
        assert_eq!(counts.get(&CardBrand::Mastercard), Some(&1));
    }

    #[test]
    fn test_card_generate_any_brand() {
        let Response::GenerateCards(report) = handle(Request::Card(CardRequest::Generate {
            count: MAX_CARD_BATCH,
            brand: BrandSelection::Any,
            mask: MaskMode::Unmasked,
            include_cvv: true,
            expiry: Some(ExpiryPolicy::default()),
        }))
        .unwrap() else {
            panic!("expected card report");
        };

        assert_eq!(report.items.len(), MAX_CARD_BATCH);
        assert_eq!(report.brand_counts.values().sum::<usize>(), MAX_CARD_BATCH);
        let engine = Engine::new().unwrap();
        for card in &report.items {
            assert_eq!(engine.card().validate(&card.number), ValidationOutcome::Valid);
            assert!(card.cvv.is_some());
            assert!(!card.expiry.as_ref().unwrap().expired);
        }
    }

    #[test]
    fn test_card_expiry_check() {
        let Response::Expiry(report) = handle(Request::Card(CardRequest::Expiry {
            inputs: strings(&["12/30", "01/2020", "soon"]),
        }))
        .unwrap() else {
            panic!("expected expiry report");
        };
        let flags: Vec<_> = report.items.iter().map(|i| i.expired).collect();
        assert_eq!(flags, vec![Some(false), Some(true), None]);
        assert_eq!((report.expired, report.unparseable), (1, 1));
    }

    #[test]
    fn test_card_generate_unknown_brand() {
        let request: Request = serde_json::from_str(
            r#"{"kind":"card","operation":"generate","count":2,"brand":"maestro"}"#,
        )
        .unwrap();
        assert!(matches!(
            handle(request),
            Err(EngineError::UnsupportedBrandForGeneration { name }) if name == "maestro"
        ));
    }

    #[test]
    fn test_card_generate_rejects_expiry_spans() {
        let request: Request = serde_json::from_str(
            r#"{"kind":"card","operation":"generate","brand":"visa",
                "expiry":{"kind":"future","max_future_years":4294967295}}"#,
        )
        .unwrap();
        assert!(matches!(
            handle(request),
            Err(EngineError::Request(RequestError::OutOfRange { field, min: 1, max }))
                if field == "max_future_years" && max == i64::from(MAX_EXPIRY_SPAN_YEARS)
        ));

        let zero_past = ExpiryPolicy {
            kind: ExpiryKind::Past,
            max_past_years: 0,
            ..ExpiryPolicy::default()
        };
        assert!(matches!(
            handle(Request::Card(CardRequest::Generate {
                count: 1,
                brand: BrandSelection::Any,
                mask: MaskMode::Masked,
                include_cvv: false,
                expiry: Some(zero_past),
            })),
            Err(EngineError::Request(RequestError::OutOfRange { field, .. }))
                if field == "max_past_years"
        ));
    }

    #[test]
    fn test_request_wire_format() {
        let request: Request = serde_json::from_str(
            r#"{"kind":"card","operation":"generate","count":3,"brand":"elo","include_cvv":true}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::Card(CardRequest::Generate {
                count: 3,
                brand: BrandSelection::Brand(CardBrand::Elo),
                mask: MaskMode::Masked,
                include_cvv: true,
                expiry: None,
            })
        );

        let request: Request =
            serde_json::from_str(r#"{"kind":"cpf","operation":"generate"}"#).unwrap();
        assert_eq!(
            request,
            Request::Cpf(DocumentRequest::Generate {
                count: 1,
                options: CpfOptions::default(),
            })
        );

        assert!(serde_json::from_str::<Request>(r#"{"kind":"pis","operation":"validate"}"#).is_err());
    }

    #[test]
    fn test_response_is_tagged() {
        let response = handle(Request::Cpf(DocumentRequest::Format {
            inputs: strings(&["11144477735"]),
            mask: MaskMode::Masked,
        }))
        .unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["operation"], "format");
        assert_eq!(json["items"][0]["formatted"], "111.444.777-35");
    }
}
