use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::auth::ScriptApiKey;
use crate::errors::AppError;
use crate::routes::body::OptionalJson;
use crate::models::SymbolPair;
use crate::services::price_update_service::{self, PriceUpdateReport};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/update-prices", post(update_prices))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePricesRequest {
    pub symbol: Option<String>,
    pub base: Option<String>,
    pub target: Option<String>,
}

/// Cron entry point gated by `x-api-key`: full chart sync, then price feed
/// recompute.
pub async fn update_prices(
    _key: ScriptApiKey,
    State(state): State<AppState>,
    OptionalJson(body): OptionalJson<UpdatePricesRequest>,
) -> Result<Json<PriceUpdateReport>, AppError> {
    let request = body.unwrap_or_default();
    let pair = match request.symbol.as_deref() {
        Some(s) => s.parse::<SymbolPair>().map_err(AppError::Validation)?,
        None => state.defaults.symbol.clone(),
    };
    let base = request.base.map(|b| b.trim().to_uppercase()).unwrap_or_else(|| state.defaults.base.clone());
    let target = request.target.map(|t| t.trim().to_uppercase()).unwrap_or_else(|| state.defaults.target.clone());

    info!("POST /script/update-prices - Updating {} and {}/{}", pair, base, target);
    let report = price_update_service::update_prices(
        state.store.as_ref(),
        state.price_source.as_ref(),
        &pair,
        &base,
        &target,
    )
    .await
    .map_err(|e| {
        error!("Scheduled price update failed for {}: {}", pair, e);
        e
    })?;

    Ok(Json(report))
}
