use sqlx::PgPool;
use tracing::{debug, error};

use crate::models::{ChartDataRecord, ChartPoint, Timeframe};

/// Replaces every row of `(symbol, timeframe)` with `points`.
///
/// Delete and insert share one transaction, so a failed insert leaves the
/// previous rows in place. Rows colliding on `(symbol, timeframe, timestamp)`
/// are skipped. Returns the number of rows inserted.
pub async fn replace_for_pair(
    pool: &PgPool,
    symbol: &str,
    timeframe: Timeframe,
    points: &[ChartPoint],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await.map_err(|e| {
        error!("Failed to begin chart sync transaction for {} {}: {}", symbol, timeframe, e);
        e
    })?;

    let deleted = sqlx::query("DELETE FROM chart_data WHERE symbol = $1 AND timeframe = $2")
        .bind(symbol)
        .bind(timeframe)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    debug!("Deleted {} chart rows for {} {}", deleted, symbol, timeframe);

    let mut inserted = 0;
    if !points.is_empty() {
        let timestamps: Vec<i64> = points.iter().map(|p| p.timestamp).collect();
        let opens: Vec<f64> = points.iter().map(|p| p.open).collect();
        let highs: Vec<f64> = points.iter().map(|p| p.high).collect();
        let lows: Vec<f64> = points.iter().map(|p| p.low).collect();
        let closes: Vec<f64> = points.iter().map(|p| p.close).collect();

        inserted = sqlx::query(
            r#"
            INSERT INTO chart_data (symbol, timeframe, timestamp, open, high, low, close)
            SELECT $1, $2::chart_timeframe, t.timestamp, t.open, t.high, t.low, t.close
            FROM UNNEST($3::BIGINT[], $4::DOUBLE PRECISION[], $5::DOUBLE PRECISION[],
                        $6::DOUBLE PRECISION[], $7::DOUBLE PRECISION[])
                AS t(timestamp, open, high, low, close)
            ON CONFLICT (symbol, timeframe, timestamp) DO NOTHING
            "#,
        )
        .bind(symbol)
        .bind(timeframe)
        .bind(&timestamps)
        .bind(&opens)
        .bind(&highs)
        .bind(&lows)
        .bind(&closes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert {} chart rows for {} {}: {}", points.len(), symbol, timeframe, e);
            e
        })?
        .rows_affected();
    }

    tx.commit().await.map_err(|e| {
        error!("Failed to commit chart sync for {} {}: {}", symbol, timeframe, e);
        e
    })?;

    Ok(inserted)
}

pub async fn fetch_for_pair(
    pool: &PgPool,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<Vec<ChartDataRecord>, sqlx::Error> {
    sqlx::query_as::<_, ChartDataRecord>(
        r#"
        SELECT symbol, timeframe, timestamp, open, high, low, close, created_at
        FROM chart_data
        WHERE symbol = $1 AND timeframe = $2
        ORDER BY timestamp ASC
        "#,
    )
    .bind(symbol)
    .bind(timeframe)
    .fetch_all(pool)
    .await
}

pub async fn fetch_latest(
    pool: &PgPool,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<Option<ChartDataRecord>, sqlx::Error> {
    sqlx::query_as::<_, ChartDataRecord>(
        r#"
        SELECT symbol, timeframe, timestamp, open, high, low, close, created_at
        FROM chart_data
        WHERE symbol = $1 AND timeframe = $2
        ORDER BY timestamp DESC
        LIMIT 1
        "#,
    )
    .bind(symbol)
    .bind(timeframe)
    .fetch_optional(pool)
    .await
}
