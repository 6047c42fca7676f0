//! # Card Expiry Dates
//!
//! Month/year pairs with the "valid through the end of the month" rule.
//!
//! ```text
//!   12/25  →  valid through 2025-12-31
//!             expired iff 2025-12-31 < today
//! ```
//!
//! Functions take `today` explicitly; callers read the clock once and reuse it
//! for both generation and the expired flag.

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::RequestError;
use crate::{DEFAULT_EXPIRY_FUTURE_YEARS, DEFAULT_EXPIRY_PAST_YEARS, MAX_EXPIRY_SPAN_YEARS};

// =============================================================================
// Formats and Policy
// =============================================================================

/// Textual layout of an expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExpiryFormat {
    #[default]
    #[serde(rename = "MM/YY")]
    MonthYearShort,
    #[serde(rename = "MM/YYYY")]
    MonthYearLong,
    #[serde(rename = "YYYY-MM")]
    YearMonth,
}

impl FromStr for ExpiryFormat {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MM/YY" => Ok(ExpiryFormat::MonthYearShort),
            "MM/YYYY" => Ok(ExpiryFormat::MonthYearLong),
            "YYYY-MM" => Ok(ExpiryFormat::YearMonth),
            other => Err(RequestError::InvalidFormat {
                field: "expiry_format".to_string(),
                reason: format!("'{other}' is not one of MM/YY, MM/YYYY, YYYY-MM"),
            }),
        }
    }
}

/// Which side of today generated expiry dates fall on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryKind {
    /// Strictly after the current year: never expired.
    #[default]
    Future,
    /// Strictly before the current year: always expired.
    Past,
    /// Coin flip between the two per date.
    Mixed,
}

impl FromStr for ExpiryKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "future" | "valid" => Ok(ExpiryKind::Future),
            "past" | "expired" => Ok(ExpiryKind::Past),
            "mixed" => Ok(ExpiryKind::Mixed),
            other => Err(RequestError::InvalidFormat {
                field: "expiry_kind".to_string(),
                reason: format!("'{other}' is not one of future, past, mixed"),
            }),
        }
    }
}

/// How to draw expiry dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryPolicy {
    pub kind: ExpiryKind,
    /// Future dates fall in `(year, year + max_future_years]`.
    pub max_future_years: u32,
    /// Past dates fall in `[year - max_past_years, year)`.
    pub max_past_years: u32,
    pub format: ExpiryFormat,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        ExpiryPolicy {
            kind: ExpiryKind::Future,
            max_future_years: DEFAULT_EXPIRY_FUTURE_YEARS,
            max_past_years: DEFAULT_EXPIRY_PAST_YEARS,
            format: ExpiryFormat::MonthYearShort,
        }
    }
}

// =============================================================================
// Expiry Date
// =============================================================================

/// A card expiry month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpiryDate {
    /// Four-digit year.
    pub year: i32,
    /// 1-12.
    pub month: u32,
}

impl ExpiryDate {
    /// Builds a date from a month and a full year.
    pub fn new(month: u32, year: i32) -> Option<Self> {
        if !(1..=12).contains(&month) || year < 1 {
            return None;
        }
        Some(ExpiryDate { year, month })
    }

    /// Last calendar day of the expiry month.
    pub fn last_day(&self) -> Option<NaiveDate> {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt())
    }

    /// True iff the last day of the month is strictly before `today`.
    pub fn is_expired_at(&self, today: NaiveDate) -> bool {
        self.last_day().map_or(true, |last| last < today)
    }

    /// Renders the date in `format`.
    pub fn format(&self, format: ExpiryFormat) -> String {
        match format {
            ExpiryFormat::MonthYearShort => {
                format!("{:02}/{:02}", self.month, self.year.rem_euclid(100))
            }
            ExpiryFormat::MonthYearLong => format!("{:02}/{:04}", self.month, self.year),
            ExpiryFormat::YearMonth => format!("{:04}-{:02}", self.year, self.month),
        }
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(ExpiryFormat::MonthYearLong))
    }
}

impl FromStr for ExpiryDate {
    type Err = RequestError;

    /// Accepts `MM/YY`, `MM/YYYY` and `YYYY-MM`. Only a two-character year
    /// is read as 20YY.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RequestError::InvalidFormat {
            field: "expiry".to_string(),
            reason: format!("'{s}' is not MM/YY, MM/YYYY or YYYY-MM"),
        };
        let numeric = |part: &str, widths: &[usize]| -> Option<(i32, usize)> {
            let part = part.trim();
            if !widths.contains(&part.len()) || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            part.parse().ok().map(|value| (value, part.len()))
        };

        let s = s.trim();
        let (month, year) = if let Some((month, year)) = s.split_once('/') {
            (numeric(month, &[1, 2]), numeric(year, &[2, 4]))
        } else if let Some((year, month)) = s.split_once('-') {
            (numeric(month, &[1, 2]), numeric(year, &[4]))
        } else {
            return Err(invalid());
        };

        match (month, year) {
            (Some((month, _)), Some((year, width))) => {
                let year = if width == 2 { 2000 + year } else { year };
                ExpiryDate::new(month as u32, year).ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Draws an expiry date relative to `today`.
///
/// Spans are clamped to `1..=MAX_EXPIRY_SPAN_YEARS`, so both sides always
/// have a year to draw from and every drawn year stays a calendar year.
/// [`Engine::handle`](crate::Engine::handle) rejects out-of-range spans before
/// they get here.
pub fn generate_expiry<R: Rng + ?Sized>(
    policy: &ExpiryPolicy,
    today: NaiveDate,
    rng: &mut R,
) -> ExpiryDate {
    let current = today.year();
    let future = policy.max_future_years.clamp(1, MAX_EXPIRY_SPAN_YEARS) as i32;
    let past = policy.max_past_years.clamp(1, MAX_EXPIRY_SPAN_YEARS) as i32;

    let go_future = match policy.kind {
        ExpiryKind::Future => true,
        ExpiryKind::Past => false,
        ExpiryKind::Mixed => rng.gen_bool(0.5),
    };

    let year = if go_future {
        rng.gen_range(current + 1..=current + future)
    } else {
        rng.gen_range(current - past..current)
    };

    ExpiryDate {
        year,
        month: rng.gen_range(1..=12),
    }
}

/// Parses `expiry` and reports whether it has passed.
///
/// Returns `None` when the text is not in one of the accepted formats.
pub fn is_expired(expiry: &str, today: NaiveDate) -> Option<bool> {
    expiry
        .parse::<ExpiryDate>()
        .ok()
        .map(|date| date.is_expired_at(today))
}

// =============================================================================
// Unit Tests
// =============================================================================
