//! Finnhub quote provider.
//!
//! Reads the `/quote` endpoint, whose `c` field is the current price.
//! Finnhub answers unknown symbols with an all-zero payload instead of an
//! error, so `c == 0 && o == 0` is reported as [`MarketDataError::SymbolNotFound`].
//!
//! Free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::constants::{FINNHUB_SOURCE, HTTP_CLIENT_TIMEOUT};
use crate::errors::MarketDataError;
use crate::models::PriceQuote;
use crate::provider::{parse_price_value, QuoteProvider};

const BASE_URL: &str = "https://finnhub.io/api/v1";

/// Response from /quote endpoint.
///
/// `c` is kept as a raw value because it shows up both as a number and as
/// a string depending on the gateway in front of the API.
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    #[serde(default)]
    c: Value,
    /// Open price of the day
    #[serde(default)]
    o: Option<f64>,
    // Note: h, l, d, dp, pc and t exist but are not used
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

/// Finnhub market data provider.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(HTTP_CLIENT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different API root (self-hosted gateway, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        // API key goes in a header so it never shows up in logged URLs
        let response = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .query(params)
            .send()
            .await
            .map_err(|e| MarketDataError::from_request(FINNHUB_SOURCE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(ErrorResponse { error: Some(msg) }) = serde_json::from_str(&body) {
                debug!("Finnhub error for {}: {}", endpoint, msg);
            }
            return Err(MarketDataError::HttpStatus {
                provider: FINNHUB_SOURCE.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::from_request(FINNHUB_SOURCE, e))
    }
}

/// Turn a /quote body into a price.
fn parse_quote(symbol: &str, text: &str) -> Result<PriceQuote, MarketDataError> {
    let response: QuoteResponse = serde_json::from_str(text).map_err(|e| {
        MarketDataError::invalid_payload(
            FINNHUB_SOURCE,
            format!("Failed to parse quote response: {}", e),
        )
    })?;

    let close = parse_price_value(&response.c).ok_or_else(|| {
        MarketDataError::invalid_payload(FINNHUB_SOURCE, format!("No numeric price for {}", symbol))
    })?;

    if close == 0.0 && response.o.unwrap_or(0.0) == 0.0 {
        return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
    }

    Ok(PriceQuote::new(close, FINNHUB_SOURCE))
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        FINNHUB_SOURCE
    }

    async fn latest_quote(&self, ticker: &str) -> Result<PriceQuote, MarketDataError> {
        let symbol = ticker.trim().to_uppercase();
        debug!("Fetching latest quote for {} from Finnhub", symbol);

        let text = self.fetch("/quote", &[("symbol", symbol.as_str())]).await?;
        parse_quote(&symbol, &text)
    }
}
