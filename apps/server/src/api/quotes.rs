use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use familyfolio_market_data::PriceOptions;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

const QUOTE_CACHE_CONTROL: &str = "public, max-age=14400, s-maxage=14400";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteQuery {
    ticker: Option<String>,
    tickers: Option<String>,
    ttl_ms: Option<u64>,
}

/// Trim, upper-case and de-duplicate a comma separated ticker list,
/// keeping first-seen order.
fn normalize_tickers(raw: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for ticker in raw.split(',').map(|t| t.trim().to_uppercase()) {
        if !ticker.is_empty() && !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}

/// `number | false`
fn price_json(price: Option<f64>) -> Value {
    price.map_or(Value::Bool(false), |p| json!(p))
}

async fn get_quote(
    State(state): State<Arc<AppState>>,
    Query(q): Query<QuoteQuery>,
) -> ApiResult<Response> {
    let options = PriceOptions {
        ttl: q.ttl_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
        ..PriceOptions::default()
    };

    let body = match (q.tickers.as_deref(), q.ticker.as_deref()) {
        (Some(list), _) => {
            let tickers = normalize_tickers(list);
            if tickers.is_empty() {
                return Err(ApiError::BadRequest("No valid tickers provided".into()));
            }
            let prices = join_all(
                tickers
                    .iter()
                    .map(|t| state.quotes.get_price_with(t, &options)),
            )
            .await;
            let prices: BTreeMap<String, Value> = tickers
                .into_iter()
                .zip(prices)
                .map(|(t, p)| (t, price_json(p)))
                .collect();
            json!({ "count": prices.len(), "prices": prices })
        }
        (None, Some(ticker)) => {
            let ticker = ticker.trim().to_uppercase();
            if ticker.is_empty() {
                return Err(ApiError::BadRequest("No valid tickers provided".into()));
            }
            let price = state.quotes.get_price_with(&ticker, &options).await;
            json!({ "ticker": ticker, "price": price_json(price) })
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Missing required query param: ticker or tickers".into(),
            ))
        }
    };

    Ok(([(header::CACHE_CONTROL, QUOTE_CACHE_CONTROL)], Json(body)).into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/quote", get(get_quote))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tickers() {
        assert_eq!(
            normalize_tickers(" aapl,MSFT,,aapl , goog"),
            vec!["AAPL", "MSFT", "GOOG"]
        );
        assert!(normalize_tickers(" , ,").is_empty());
    }

    #[test]
    fn test_price_json() {
        assert_eq!(price_json(Some(1.5)), json!(1.5));
        assert_eq!(price_json(None), json!(false));
    }
}
