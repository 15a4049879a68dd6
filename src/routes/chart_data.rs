use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::auth::AdminSession;
use crate::errors::AppError;
use crate::routes::body::OptionalJson;
use crate::models::{ChartDataQuery, ChartDataRecord, SymbolPair, SyncChartDataRequest, Timeframe};
use crate::services;
use crate::services::chart_sync_service::SyncSummary;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_chart_data).post(sync_chart_data))
}

fn parse_timeframe(raw: Option<&str>) -> Result<Option<Timeframe>, AppError> {
    raw.map(str::parse::<Timeframe>).transpose().map_err(AppError::Validation)
}

pub async fn get_chart_data(
    Query(query): Query<ChartDataQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ChartDataRecord>>, AppError> {
    let pair: SymbolPair = query.symbol.parse().map_err(AppError::Validation)?;
    let timeframe = parse_timeframe(query.timeframe.as_deref())?.unwrap_or(Timeframe::OneDay);
    info!("GET /chart-data?symbol={}&timeframe={} - Reading chart data", pair, timeframe);

    let rows = services::chart_sync_service::get_chart_data(
        state.store.as_ref(),
        &pair.to_string(),
        timeframe,
    )
    .await?;
    Ok(Json(rows))
}

/// Admin-only. Syncs one timeframe or all of them from the source, or writes
/// the supplied `points` instead of calling the source.
pub async fn sync_chart_data(
    AdminSession(session): AdminSession,
    State(state): State<AppState>,
    OptionalJson(body): OptionalJson<SyncChartDataRequest>,
) -> Result<Json<SyncSummary>, AppError> {
    let request = body.unwrap_or_default();
    let pair = match request.symbol.as_deref() {
        Some(s) => s.parse::<SymbolPair>().map_err(AppError::Validation)?,
        None => state.defaults.symbol.clone(),
    };
    let timeframe = parse_timeframe(request.timeframe.as_deref())?;

    info!(
        "POST /chart-data - {} syncing {} ({})",
        session.sub,
        pair,
        timeframe.map(|tf| tf.to_string()).unwrap_or_else(|| "all timeframes".to_string())
    );

    let summary = match request.points {
        Some(points) => {
            let timeframe = timeframe.unwrap_or(Timeframe::OneDay);
            services::chart_sync_service::sync_supplied(state.store.as_ref(), &pair, timeframe, &points).await
        }
        None => {
            let timeframes = match timeframe {
                Some(tf) => vec![tf],
                None => Timeframe::ALL.to_vec(),
            };
            services::chart_sync_service::sync_from_source(
                state.store.as_ref(),
                state.price_source.as_ref(),
                &pair,
                &timeframes,
            )
            .await
        }
    }
    .map_err(|e| {
        error!("Failed to sync chart data for {}: {}", pair, e);
        e
    })?;

    Ok(Json(summary))
}
