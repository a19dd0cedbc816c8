use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use familyfolio_market_data::provider::parse_leading_float;

/// A number as it appears in hand-maintained fixtures: a JSON number, a
/// numeric string such as `"12.50"`, or something unusable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Numeric {
    /// Lenient parse: numbers as-is, strings by their leading numeric
    /// prefix, everything else `NaN`.
    pub fn parse(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => parse_leading_float(s).unwrap_or(f64::NAN),
            Self::Other(_) => f64::NAN,
        }
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Parse an optional field; a missing value is `NaN`.
pub(crate) fn parse_numeric(value: Option<&Numeric>) -> f64 {
    value.map_or(f64::NAN, Numeric::parse)
}

/// One purchase of a ticker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Lot {
    #[serde(default)]
    pub shares: Option<Numeric>,
    #[serde(default)]
    pub price: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Lot {
    pub fn new(shares: impl Into<Numeric>, price: impl Into<Numeric>) -> Self {
        Self {
            shares: Some(shares.into()),
            price: Some(price.into()),
            date: None,
        }
    }
}

/// A position as stored in a portfolio fixture.
///
/// Either `lots` carries the purchase history or `shares`/`averageCost` are
/// given directly. Fields this type does not know about are kept in
/// `extra` and written back out unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub ticker: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<Numeric>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<Numeric>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lots: Option<Vec<Lot>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Holding {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            shares: None,
            average_cost: None,
            lots: None,
            image: None,
            display: None,
            extra: Map::new(),
        }
    }

    pub fn with_position(mut self, shares: impl Into<Numeric>, average_cost: impl Into<Numeric>) -> Self {
        self.shares = Some(shares.into());
        self.average_cost = Some(average_cost.into());
        self
    }

    pub fn with_lots(mut self, lots: Vec<Lot>) -> Self {
        self.lots = Some(lots);
        self
    }
}

/// A holding with resolved position and current price.
///
/// `average_cost` is `NaN` when it could not be determined, and `current`
/// falls back to it when no usable price was fetched. `NaN` is written as
/// `null` on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedHolding {
    pub ticker: String,
    pub shares: f64,
    pub average_cost: f64,
    pub current: f64,

    #[serde(
        rename = "_priceFetchFailed",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub price_fetch_failed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lots: Option<Vec<Lot>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnrichedHolding {
    pub fn market_value(&self) -> f64 {
        self.current * self.shares
    }

    pub fn invested(&self) -> f64 {
        self.average_cost * self.shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_parse() {
        assert_eq!(Numeric::Number(2.5).parse(), 2.5);
        assert_eq!(Numeric::from(" 12.50 ").parse(), 12.5);
        assert_eq!(Numeric::from("7abc").parse(), 7.0);
        assert!(Numeric::from("x").parse().is_nan());
        assert!(Numeric::Other(json!(true)).parse().is_nan());
        assert!(parse_numeric(None).is_nan());
    }

    #[test]
    fn test_holding_from_fixture_json() {
        let holding: Holding = serde_json::from_value(json!({
            "ticker": "AAPL",
            "shares": "4",
            "averageCost": 150.25,
            "image": "apple.png",
            "sector": "Tech"
        }))
        .unwrap();

        assert_eq!(holding.ticker, "AAPL");
        assert_eq!(holding.shares, Some(Numeric::Text("4".to_string())));
        assert_eq!(holding.average_cost, Some(Numeric::Number(150.25)));
        assert_eq!(holding.image.as_deref(), Some("apple.png"));
        assert_eq!(holding.extra.get("sector"), Some(&json!("Tech")));
    }

    #[test]
    fn test_holding_with_lots() {
        let holding: Holding = serde_json::from_value(json!({
            "ticker": "msft",
            "lots": [
                { "shares": 2, "price": "10", "date": "2023-01-05" },
                { "shares": "3", "price": 20 }
            ]
        }))
        .unwrap();

        let lots = holding.lots.unwrap();
        assert_eq!(lots.len(), 2);
        assert_eq!(lots[0].date.as_deref(), Some("2023-01-05"));
        assert_eq!(lots[1].shares.as_ref().map(Numeric::parse), Some(3.0));
    }

    #[test]
    fn test_null_fields_are_missing() {
        let holding: Holding =
            serde_json::from_value(json!({ "ticker": "X", "shares": null, "averageCost": null }))
                .unwrap();
        assert!(holding.shares.is_none());
        assert!(holding.average_cost.is_none());
    }

    #[test]
    fn test_enriched_holding_wire_shape() {
        let enriched = EnrichedHolding {
            ticker: "AAPL".to_string(),
            shares: 2.0,
            average_cost: 10.0,
            current: 10.0,
            price_fetch_failed: true,
            lots: None,
            image: None,
            display: Some("Apple".to_string()),
            extra: Map::new(),
        };

        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(
            value,
            json!({
                "ticker": "AAPL",
                "shares": 2.0,
                "averageCost": 10.0,
                "current": 10.0,
                "_priceFetchFailed": true,
                "display": "Apple"
            })
        );
    }

    #[test]
    fn test_successful_price_omits_failure_flag() {
        let enriched = EnrichedHolding {
            ticker: "AAPL".to_string(),
            shares: 1.0,
            average_cost: 1.0,
            current: 2.0,
            price_fetch_failed: false,
            lots: None,
            image: None,
            display: None,
            extra: Map::new(),
        };
        let value = serde_json::to_value(&enriched).unwrap();
        assert!(value.get("_priceFetchFailed").is_none());
        assert_eq!(enriched.market_value(), 2.0);
        assert_eq!(enriched.invested(), 1.0);
    }
}
