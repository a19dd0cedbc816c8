use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use familyfolio_market_data::HistoryOptions;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

const HISTORY_CACHE_CONTROL: &str = "public, max-age=1800, s-maxage=1800";
const CACHE_TAG: HeaderName = HeaderName::from_static("cache-tag");

#[derive(Deserialize)]
struct HistoryQuery {
    ticker: Option<String>,
    since: Option<String>,
}

/// `<site>,fn:getHistory,ticker:<T>[,filtered]`
fn cache_tags(site_tag: &str, ticker: &str, filtered: bool) -> String {
    let mut tags = vec![
        site_tag.to_string(),
        "fn:getHistory".to_string(),
        format!("ticker:{}", ticker),
    ];
    if filtered {
        tags.push("filtered".to_string());
    }
    tags.join(",")
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Response> {
    let ticker = q
        .ticker
        .as_deref()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing ticker".into()))?;

    let since = match q.since.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            ApiError::BadRequest(format!("Invalid since date '{}', expected YYYY-MM-DD", raw))
        })?),
        None => None,
    };

    let options = HistoryOptions {
        since,
        force: false,
    };
    let history = state.history.get_year_history(&ticker, &options).await;
    let tags = cache_tags(&state.cache_tag, &ticker, since.is_some());

    Ok((
        [
            (header::CACHE_CONTROL, HISTORY_CACHE_CONTROL.to_string()),
            (CACHE_TAG, tags),
        ],
        Json(history),
    )
        .into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/history", get(get_history))
}
