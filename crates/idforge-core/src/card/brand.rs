//! Card brand names.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{EngineError, EngineResult};

/// A payment network known to the registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Elo,
    Hipercard,
    Diners,
    Discover,
    Jcb,
    Aura,
}

impl CardBrand {
    /// Every brand, in registry order.
    pub const ALL: [CardBrand; 9] = [
        CardBrand::Visa,
        CardBrand::Mastercard,
        CardBrand::Amex,
        CardBrand::Elo,
        CardBrand::Hipercard,
        CardBrand::Diners,
        CardBrand::Discover,
        CardBrand::Jcb,
        CardBrand::Aura,
    ];

    /// Serialized name (`"amex"`, `"diners"`).
    pub const fn slug(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Amex => "amex",
            CardBrand::Elo => "elo",
            CardBrand::Hipercard => "hipercard",
            CardBrand::Diners => "diners",
            CardBrand::Discover => "discover",
            CardBrand::Jcb => "jcb",
            CardBrand::Aura => "aura",
        }
    }

    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::Amex => "American Express",
            CardBrand::Elo => "Elo",
            CardBrand::Hipercard => "Hipercard",
            CardBrand::Diners => "Diners Club",
            CardBrand::Discover => "Discover",
            CardBrand::Jcb => "JCB",
            CardBrand::Aura => "Aura",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CardBrand {
    type Err = EngineError;

    /// Case-insensitive; spaces, hyphens and underscores are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "visa" => Ok(CardBrand::Visa),
            "mastercard" | "master" | "mc" => Ok(CardBrand::Mastercard),
            "amex" | "americanexpress" => Ok(CardBrand::Amex),
            "elo" => Ok(CardBrand::Elo),
            "hipercard" | "hiper" => Ok(CardBrand::Hipercard),
            "diners" | "dinersclub" => Ok(CardBrand::Diners),
            "discover" => Ok(CardBrand::Discover),
            "jcb" => Ok(CardBrand::Jcb),
            "aura" => Ok(CardBrand::Aura),
            _ => Err(EngineError::UnsupportedBrandForGeneration {
                name: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Brand Selection
// =============================================================================

/// Brand requested for generation: one brand, or a random one per number.
///
/// Names that match no brand are kept as [`BrandSelection::Named`] so the
/// engine can reject them with
/// [`EngineError::UnsupportedBrandForGeneration`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BrandSelection {
    #[default]
    Any,
    Brand(CardBrand),
    Named(String),
}

impl BrandSelection {
    /// The requested brand; `None` for [`BrandSelection::Any`].
    pub fn brand(&self) -> EngineResult<Option<CardBrand>> {
        match self {
            BrandSelection::Any => Ok(None),
            BrandSelection::Brand(brand) => Ok(Some(*brand)),
            BrandSelection::Named(name) => name.parse().map(Some),
        }
    }
}

impl From<String> for BrandSelection {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        match trimmed.to_lowercase().as_str() {
            "any" | "random" | "" => BrandSelection::Any,
            _ => trimmed
                .parse()
                .map(BrandSelection::Brand)
                .unwrap_or_else(|_| BrandSelection::Named(trimmed.to_string())),
        }
    }
}

impl FromStr for BrandSelection {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BrandSelection::from(s.to_string()))
    }
}

impl From<BrandSelection> for String {
    fn from(selection: BrandSelection) -> Self {
        match selection {
            BrandSelection::Any => "any".to_string(),
            BrandSelection::Brand(brand) => brand.slug().to_string(),
            BrandSelection::Named(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_brand_aliases() {
        assert_eq!("VISA".parse::<CardBrand>().unwrap(), CardBrand::Visa);
        assert_eq!(
            "American Express".parse::<CardBrand>().unwrap(),
            CardBrand::Amex
        );
        assert_eq!("diners_club".parse::<CardBrand>().unwrap(), CardBrand::Diners);
        assert!(matches!(
            "maestro".parse::<CardBrand>(),
            Err(EngineError::UnsupportedBrandForGeneration { name }) if name == "maestro"
        ));
    }

    #[test]
    fn test_brand_selection_serde() {
        let selection: BrandSelection = serde_json::from_str(r#""any""#).unwrap();
        assert_eq!(selection, BrandSelection::Any);

        let selection: BrandSelection = serde_json::from_str(r#""Hipercard""#).unwrap();
        assert_eq!(selection, BrandSelection::Brand(CardBrand::Hipercard));

        let json = serde_json::to_string(&BrandSelection::Brand(CardBrand::Amex)).unwrap();
        assert_eq!(json, r#""amex""#);

        let selection: BrandSelection = serde_json::from_str(r#"" maestro ""#).unwrap();
        assert_eq!(selection, BrandSelection::Named("maestro".to_string()));
        assert_eq!(serde_json::to_string(&selection).unwrap(), r#""maestro""#);
    }

    #[test]
    fn test_brand_selection_resolves_names() {
        assert_eq!(BrandSelection::Any.brand().unwrap(), None);
        assert_eq!(
            "Diners Club".parse::<BrandSelection>().unwrap().brand().unwrap(),
            Some(CardBrand::Diners)
        );
        assert!(matches!(
            BrandSelection::Named("maestro".to_string()).brand(),
            Err(EngineError::UnsupportedBrandForGeneration { name }) if name == "maestro"
        ));
    }
}
