//! Stooq market data provider.
//!
//! Stooq serves public CSV without an API key:
//! - Latest quote: `/q/l/?s=<sym>&f=sd2t2ohlcv&e=csv`
//! - Daily history: `/q/d/l/?s=<sym>&i=d`
//! - FX rates use the same quote endpoint with `<from><to>` symbols (`hkdusd`)
//!
//! Bare tickers are treated as US listings (`aapl.us`); tickers that already
//! carry an exchange suffix (`0700.HK`) are passed through lower-cased.

mod parse;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Request};
use tracing::debug;

use crate::constants::{HTTP_CLIENT_TIMEOUT, STOOQ_SOURCE};
use crate::errors::MarketDataError;
use crate::models::{Currency, PriceQuote, YearHistory};
use crate::provider::{FxRateProvider, HistoryProvider, QuoteProvider};

use parse::{parse_history_csv, parse_quote_csv};

const BASE_URL: &str = "https://stooq.com";
const QUOTE_PATH: &str = "/q/l/";
const HISTORY_PATH: &str = "/q/d/l/";

/// Exchange suffix to quote currency.
const SUFFIX_CURRENCIES: &[(&str, &str)] = &[
    ("us", "USD"),
    ("hk", "HKD"),
    ("jp", "JPY"),
    ("de", "EUR"),
    ("f", "EUR"),
];

/// Stooq provider for quotes, history and FX rates.
#[derive(Clone)]
pub struct StooqProvider {
    client: Client,
    base_url: String,
}

impl StooqProvider {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(HTTP_CLIENT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different host (mirror, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Request for the daily history CSV of `ticker`.
    pub fn history_request(&self, ticker: &str) -> Result<Request, MarketDataError> {
        let symbol = stooq_symbol(ticker);
        self.build_request(HISTORY_PATH, &[("s", symbol.as_str()), ("i", "d")])
    }

    /// URL of the daily history CSV for `ticker`.
    pub fn history_url(&self, ticker: &str) -> Result<String, MarketDataError> {
        self.history_request(ticker).map(|r| r.url().to_string())
    }

    fn quote_request(&self, symbol: &str) -> Result<Request, MarketDataError> {
        self.build_request(
            QUOTE_PATH,
            &[("s", symbol), ("f", "sd2t2ohlcv"), ("e", "csv")],
        )
    }

    fn build_request(&self, path: &str, params: &[(&str, &str)]) -> Result<Request, MarketDataError> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .build()
            .map_err(|e| MarketDataError::from_request(STOOQ_SOURCE, e))
    }

    async fn fetch_text(&self, request: Request) -> Result<String, MarketDataError> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| MarketDataError::from_request(STOOQ_SOURCE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::HttpStatus {
                provider: STOOQ_SOURCE.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::from_request(STOOQ_SOURCE, e))
    }
}

impl Default for StooqProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a ticker to its Stooq symbol.
pub fn stooq_symbol(ticker: &str) -> String {
    let lower = ticker.trim().to_lowercase();
    if lower.contains('.') {
        lower
    } else {
        format!("{}.us", lower)
    }
}

/// Quote currency implied by the Stooq symbol suffix, if known.
pub fn currency_for_symbol(symbol: &str) -> Option<Currency> {
    let (_, suffix) = symbol.rsplit_once('.')?;
    SUFFIX_CURRENCIES
        .iter()
        .find(|(s, _)| suffix.eq_ignore_ascii_case(s))
        .map(|&(_, c)| Currency::Borrowed(c))
}

#[async_trait]
impl QuoteProvider for StooqProvider {
    fn id(&self) -> &'static str {
        "STOOQ"
    }

    async fn latest_quote(&self, ticker: &str) -> Result<PriceQuote, MarketDataError> {
        let symbol = stooq_symbol(ticker);
        debug!("Fetching latest quote for {} from Stooq", symbol);

        let text = self.fetch_text(self.quote_request(&symbol)?).await?;
        let price = parse_quote_csv(ticker, &text)?;

        let quote = PriceQuote::new(price, STOOQ_SOURCE);
        Ok(match currency_for_symbol(&symbol) {
            Some(currency) => quote.with_currency(currency),
            None => quote,
        })
    }
}

#[async_trait]
impl HistoryProvider for StooqProvider {
    fn id(&self) -> &'static str {
        "STOOQ"
    }

    async fn year_history(
        &self,
        ticker: &str,
        since: Option<NaiveDate>,
    ) -> Result<YearHistory, MarketDataError> {
        let request = self.history_request(ticker)?;
        let url = request.url().to_string();
        debug!("Fetching history for {} from Stooq (since {:?})", ticker, since);

        let text = self.fetch_text(request).await?;
        let prices = parse_history_csv(&text, since);

        debug!("Stooq: {} daily closes for {}", prices.len(), ticker);

        Ok(YearHistory {
            ticker: Some(ticker.trim().to_uppercase()),
            prices,
            source: STOOQ_SOURCE.to_string(),
            attempted: Some(url),
            since,
            error: false,
        })
    }
}

#[async_trait]
impl FxRateProvider for StooqProvider {
    fn id(&self) -> &'static str {
        "STOOQ"
    }

    async fn fx_rate(&self, from: &str, to: &str) -> Result<f64, MarketDataError> {
        let pair = format!("{}{}", from, to).to_lowercase();
        debug!("Fetching FX rate {} from Stooq", pair);

        let text = self.fetch_text(self.quote_request(&pair)?).await?;
        let rate = parse_quote_csv(&pair, &text)?;
        if rate <= 0.0 {
            return Err(MarketDataError::FxRateUnavailable {
                from: from.to_uppercase(),
                to: to.to_uppercase(),
            });
        }
        Ok(rate)
    }
}
