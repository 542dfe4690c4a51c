use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, OverlayResult};

/// Instrument being tracked: where its page lives and how its row is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    pub id: String,
    /// Value of the `data-symbol` attribute on the quote row.
    pub symbol: String,
    pub target_url: String,
    /// Case-insensitive pattern matching the maturity label ("10 Year", "US10Y", ...).
    pub label_pattern: String,
    /// Prefix of the tooltip, e.g. `US 10Y Yield`.
    pub title: String,
}

impl InstrumentProfile {
    #[must_use]
    pub fn us_10y() -> Self {
        Self {
            id: "us10y".to_owned(),
            symbol: "USGG10YR:IND".to_owned(),
            target_url: "https://tradingeconomics.com/united-states/government-bond-yield"
                .to_owned(),
            label_pattern: r"USGG10YR|(?:US\s*)?10\s*-?\s*(?:Year|yr|Y)".to_owned(),
            title: "US 10Y Yield".to_owned(),
        }
    }

    #[must_use]
    pub fn us_20y() -> Self {
        Self {
            id: "us20y".to_owned(),
            symbol: "USGG20Y:IND".to_owned(),
            target_url: "https://tradingeconomics.com/united-states/20-year-bond-yield".to_owned(),
            label_pattern: r"USGG20YR?|(?:US\s*)?20\s*-?\s*(?:Year|yr|Y)".to_owned(),
            title: "US 20Y Yield".to_owned(),
        }
    }

    /// Looks up a built-in profile by id.
    pub fn builtin(id: &str) -> OverlayResult<Self> {
        match id.to_ascii_lowercase().as_str() {
            "us10y" => Ok(Self::us_10y()),
            "us20y" => Ok(Self::us_20y()),
            other => Err(OverlayError::Config(format!(
                "unknown instrument profile `{other}` (expected `us10y` or `us20y`)"
            ))),
        }
    }

    pub fn label_regex(&self) -> OverlayResult<Regex> {
        Regex::new(&format!("(?i){}", self.label_pattern)).map_err(|e| {
            OverlayError::Config(format!("invalid label pattern for `{}`: {e}", self.id))
        })
    }
}

impl Default for InstrumentProfile {
    fn default() -> Self {
        Self::us_10y()
    }
}
