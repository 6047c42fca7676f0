//! CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;

use idforge_core::dispatch::Limits;
use idforge_core::validation::validate_expiry_span;
use idforge_core::{
    RequestError, DEFAULT_EXPIRY_FUTURE_YEARS, DEFAULT_EXPIRY_PAST_YEARS, MAX_CARD_BATCH,
    MAX_DOCUMENT_BATCH,
};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Batch caps handed to the engine (never above the core's hard caps)
    pub limits: Limits,

    /// Default span for future card expiry dates, in years
    pub expiry_future_years: u32,

    /// Default span for past card expiry dates, in years
    pub expiry_past_years: u32,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str, default: String| -> Result<u64, ConfigError> {
            lookup(key)
                .unwrap_or(default)
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        };

        let max_document_batch = number(
            "IDFORGE_MAX_DOCUMENT_BATCH",
            MAX_DOCUMENT_BATCH.to_string(),
        )? as usize;
        let max_card_batch = number("IDFORGE_MAX_CARD_BATCH", MAX_CARD_BATCH.to_string())? as usize;

        let expiry_future_years = u32::try_from(number(
            "IDFORGE_EXPIRY_FUTURE_YEARS",
            DEFAULT_EXPIRY_FUTURE_YEARS.to_string(),
        )?)
        .map_err(|_| ConfigError::InvalidValue("IDFORGE_EXPIRY_FUTURE_YEARS".to_string()))?;

        let expiry_past_years = u32::try_from(number(
            "IDFORGE_EXPIRY_PAST_YEARS",
            DEFAULT_EXPIRY_PAST_YEARS.to_string(),
        )?)
        .map_err(|_| ConfigError::InvalidValue("IDFORGE_EXPIRY_PAST_YEARS".to_string()))?;

        validate_expiry_span(expiry_future_years, "IDFORGE_EXPIRY_FUTURE_YEARS")?;
        validate_expiry_span(expiry_past_years, "IDFORGE_EXPIRY_PAST_YEARS")?;

        let pretty = lookup("IDFORGE_PRETTY")
            .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(CliConfig {
            limits: Limits::new(max_document_batch, max_card_batch)?,
            expiry_future_years,
            expiry_past_years,
            pretty,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid limit: {0}")]
    Limit(#[from] RequestError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<CliConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.limits, Limits::default());
        assert_eq!(config.expiry_future_years, DEFAULT_EXPIRY_FUTURE_YEARS);
        assert_eq!(config.expiry_past_years, DEFAULT_EXPIRY_PAST_YEARS);
        assert!(!config.pretty);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("IDFORGE_MAX_DOCUMENT_BATCH", "10"),
            ("IDFORGE_MAX_CARD_BATCH", "5"),
            ("IDFORGE_EXPIRY_FUTURE_YEARS", "8"),
            ("IDFORGE_PRETTY", "true"),
        ])
        .unwrap();
        assert_eq!(config.limits.max_document_batch, 10);
        assert_eq!(config.limits.max_card_batch, 5);
        assert_eq!(config.expiry_future_years, 8);
        assert!(config.pretty);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            load(&[("IDFORGE_MAX_CARD_BATCH", "lots")]),
            Err(ConfigError::InvalidValue(key)) if key == "IDFORGE_MAX_CARD_BATCH"
        ));
        assert!(matches!(
            load(&[("IDFORGE_MAX_CARD_BATCH", "500")]),
            Err(ConfigError::Limit(_))
        ));
        assert!(matches!(
            load(&[("IDFORGE_MAX_DOCUMENT_BATCH", "0")]),
            Err(ConfigError::Limit(_))
        ));
    }

    #[test]
    fn test_rejects_expiry_spans_out_of_range() {
        for value in ["0", "51", "4294967295"] {
            assert!(matches!(
                load(&[("IDFORGE_EXPIRY_FUTURE_YEARS", value)]),
                Err(ConfigError::Limit(RequestError::OutOfRange { field, .. }))
                    if field == "IDFORGE_EXPIRY_FUTURE_YEARS"
            ));
        }
        assert!(matches!(
            load(&[("IDFORGE_EXPIRY_PAST_YEARS", "1000000")]),
            Err(ConfigError::Limit(RequestError::OutOfRange { field, .. }))
                if field == "IDFORGE_EXPIRY_PAST_YEARS"
        ));
        assert_eq!(
            load(&[("IDFORGE_EXPIRY_PAST_YEARS", "50")])
                .unwrap()
                .expiry_past_years,
            50
        );
    }
}
