use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::routes::body::OptionalJson;
use crate::models::{PriceFeedQuery, PriceFeedView, RecomputePriceFeedRequest, RecomputedPriceFeed, SymbolPair};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_price_feed).post(recompute_price_feed))
}

pub async fn get_price_feed(
    Query(query): Query<PriceFeedQuery>,
    State(state): State<AppState>,
) -> Result<Json<PriceFeedView>, AppError> {
    let base = query.base.trim().to_uppercase();
    let target = query.target.trim().to_uppercase();
    info!("GET /price-feed?base={}&target={} - Reading price feed", base, target);

    let view = services::price_feed_service::get_price_feed(state.store.as_ref(), &base, &target).await?;
    Ok(Json(view))
}

pub async fn recompute_price_feed(
    State(state): State<AppState>,
    OptionalJson(body): OptionalJson<RecomputePriceFeedRequest>,
) -> Result<Json<RecomputedPriceFeed>, AppError> {
    let request = body.unwrap_or_default();
    let base = request.base.map(|b| b.trim().to_uppercase()).unwrap_or_else(|| state.defaults.base.clone());
    let target = request.target.map(|t| t.trim().to_uppercase()).unwrap_or_else(|| state.defaults.target.clone());
    let symbol = match request.symbol {
        Some(s) => s.parse::<SymbolPair>().map_err(AppError::Validation)?,
        None => state.defaults.symbol.clone(),
    };

    info!("POST /price-feed - Recomputing {}/{} from {}", base, target, symbol);
    let result = services::price_feed_service::recompute(
        state.store.as_ref(),
        &base,
        &target,
        &symbol.to_string(),
    )
    .await
    .map_err(|e| {
        match &e {
            AppError::NoChartData(_) => warn!("Cannot recompute {}/{}: {}", base, target, e),
            _ => error!("Failed to recompute price feed {}/{}: {}", base, target, e),
        }
        e
    })?;

    Ok(Json(result))
}
