use crate::errors::AppError;
use crate::models::Timeframe;
use crate::services::job_scheduler_service::{JobContext, JobResult};
use crate::services::price_update_service;
use tracing::info;

/// Scheduled counterpart of `POST /api/script/update-prices` for the
/// configured default pair.
///
/// Each timeframe counts as one item; timeframes the source had no data for
/// count as failed.
pub async fn update_default_prices(ctx: JobContext) -> Result<JobResult, AppError> {
    let defaults = &ctx.defaults;

    let report = price_update_service::update_prices(
        ctx.store.as_ref(),
        ctx.price_source.as_ref(),
        &defaults.symbol,
        &defaults.base,
        &defaults.target,
    )
    .await?;

    info!(
        "Price feed {}/{} now {} ({} chart rows)",
        defaults.base, defaults.target, report.price_feed.price_feed.rate, report.sync.total_rows
    );

    let processed = report.sync.synced.len() as i32;
    Ok(JobResult {
        items_processed: processed,
        items_failed: Timeframe::ALL.len() as i32 - processed,
    })
}
