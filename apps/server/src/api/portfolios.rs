use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use familyfolio_core::{summarize, EnrichedHolding, PortfolioInfo, PortfolioSummary};
use serde::Serialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioDetail {
    portfolio: PortfolioInfo,
    holdings: Vec<EnrichedHolding>,
    summary: PortfolioSummary,
}

async fn list_portfolios(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<PortfolioInfo>>> {
    let portfolios = state
        .registry
        .for_family(&state.site_family)
        .into_iter()
        .map(|p| p.info())
        .collect();
    Ok(Json(portfolios))
}

async fn get_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioDetail>> {
    let portfolio = state
        .registry
        .get(&id)
        .filter(|p| p.is_visible_to(&state.site_family))
        .ok_or(ApiError::NotFound)?;

    let holdings = state.enricher.enrich_holdings(&portfolio.holdings).await;
    let summary = summarize(&holdings);
    if summary.prices_may_be_stale {
        tracing::warn!(
            "Portfolio {} valued with cost fallback for some holdings",
            portfolio.id
        );
    }

    Ok(Json(PortfolioDetail {
        portfolio: portfolio.info(),
        holdings,
        summary,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolios", get(list_portfolios))
        .route("/portfolios/{id}", get(get_portfolio))
}
