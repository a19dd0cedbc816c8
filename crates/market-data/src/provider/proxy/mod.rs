//! Client for the Familyfolio proxy endpoints.
//!
//! - `GET <quote-endpoint>?ticker=SYM` answers `{ "ticker": "SYM", "price": 123.4 }`
//!   where `price` may also be a numeric string, or `false` when unavailable.
//! - `GET <history-endpoint>?ticker=SYM&since=YYYY-MM-DD` answers a
//!   [`YearHistory`] payload.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::constants::{HTTP_CLIENT_TIMEOUT, PROXY_SOURCE};
use crate::errors::MarketDataError;
use crate::models::{PriceQuote, YearHistory};
use crate::provider::{parse_price_value, HistoryProvider, QuoteProvider};

/// Path of the quote endpoint relative to the server root.
pub const QUOTE_PATH: &str = "/api/quote";
/// Path of the history endpoint relative to the server root.
pub const HISTORY_PATH: &str = "/api/history";

#[derive(Debug, Deserialize)]
struct ProxyQuoteResponse {
    #[serde(default)]
    price: Value,
}

/// Quote and history provider backed by the proxy server.
#[derive(Clone)]
pub struct ProxyProvider {
    client: Client,
    quote_endpoint: String,
    history_endpoint: String,
}

impl ProxyProvider {
    /// Create a provider from explicit endpoint URLs.
    pub fn new(quote_endpoint: impl Into<String>, history_endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(HTTP_CLIENT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            quote_endpoint: quote_endpoint.into(),
            history_endpoint: history_endpoint.into(),
        }
    }

    /// Create a provider for a server root such as `https://stocks.example.com`.
    pub fn from_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self::new(
            format!("{}{}", base, QUOTE_PATH),
            format!("{}{}", base, HISTORY_PATH),
        )
    }

    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<reqwest::Response, MarketDataError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| MarketDataError::from_request(PROXY_SOURCE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::HttpStatus {
                provider: PROXY_SOURCE.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

fn parse_proxy_quote(ticker: &str, body: ProxyQuoteResponse) -> Result<PriceQuote, MarketDataError> {
    parse_price_value(&body.price)
        .map(|price| PriceQuote::new(price, PROXY_SOURCE))
        .ok_or_else(|| {
            MarketDataError::invalid_payload(PROXY_SOURCE, format!("no numeric price for {}", ticker))
        })
}

#[async_trait]
impl QuoteProvider for ProxyProvider {
    fn id(&self) -> &'static str {
        PROXY_SOURCE
    }

    async fn latest_quote(&self, ticker: &str) -> Result<PriceQuote, MarketDataError> {
        let symbol = ticker.trim().to_uppercase();
        debug!("Fetching latest quote for {} from proxy", symbol);

        let response = self
            .get(&self.quote_endpoint, &[("ticker", symbol.clone())])
            .await?;
        let body: ProxyQuoteResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::from_request(PROXY_SOURCE, e))?;

        parse_proxy_quote(&symbol, body)
    }
}

#[async_trait]
impl HistoryProvider for ProxyProvider {
    fn id(&self) -> &'static str {
        PROXY_SOURCE
    }

    async fn year_history(
        &self,
        ticker: &str,
        since: Option<NaiveDate>,
    ) -> Result<YearHistory, MarketDataError> {
        let symbol = ticker.trim().to_uppercase();
        let mut params = vec![("ticker", symbol)];
        if let Some(since) = since {
            params.push(("since", since.format("%Y-%m-%d").to_string()));
        }

        let response = self.get(&self.history_endpoint, &params).await?;
        let mut history: YearHistory = response
            .json()
            .await
            .map_err(|e| MarketDataError::from_request(PROXY_SOURCE, e))?;

        if history.since.is_none() {
            history.since = since;
        }
        Ok(history)
    }
}
