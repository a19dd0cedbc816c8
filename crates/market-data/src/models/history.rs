use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily close.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading day, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Trailing daily closes for a ticker.
///
/// This is also the wire shape of the history endpoint, so unknown fields
/// are ignored and missing ones default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,

    /// Closes ordered by date ascending
    #[serde(default)]
    pub prices: Vec<PricePoint>,

    #[serde(default = "default_source")]
    pub source: String,

    /// Upstream URL that was queried
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempted: Option<String>,

    /// Earliest date requested, if the series was filtered
    #[serde(default)]
    pub since: Option<NaiveDate>,

    /// Set when the lookup failed and `prices` is a placeholder
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

fn default_source() -> String {
    crate::constants::STOOQ_SOURCE.to_string()
}

impl YearHistory {
    /// Placeholder returned when a lookup fails.
    pub fn failed(since: Option<NaiveDate>) -> Self {
        Self {
            source: default_source(),
            since,
            error: true,
            ..Self::default()
        }
    }

    /// Empty, non-error history (e.g. for an empty ticker).
    pub fn empty() -> Self {
        Self {
            source: default_source(),
            ..Self::default()
        }
    }

    /// Most recent close, if any.
    pub fn latest_close(&self) -> Option<f64> {
        self.prices.last().map(|p| p.close)
    }
}
