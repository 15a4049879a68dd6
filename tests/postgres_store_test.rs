//! Postgres-backed tests for the chart data and price feed queries.
//!
//! Each test gets a fresh database with the migrations applied. They need a
//! running Postgres, so run them with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

use chrono::NaiveDate;
use sqlx::PgPool;

use rwa_price_backend::db::{chart_data_queries, price_feed_queries};
use rwa_price_backend::models::{ChartPoint, Timeframe, UpsertPriceFeed};
use rwa_price_backend::store::{PgPriceStore, PriceStore};

const SYMBOL: &str = "IDRX/USD";

fn points(prices: &[(i64, f64)]) -> Vec<ChartPoint> {
    prices.iter().map(|&(ts, price)| ChartPoint::from_single_price(ts, price)).collect()
}

fn feed(rate: f64, date: NaiveDate) -> UpsertPriceFeed {
    UpsertPriceFeed {
        base: "USD".to_string(),
        target: "IDR".to_string(),
        rate,
        date,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_replace_round_trip_sorted_and_skips_conflicts(pool: PgPool) -> sqlx::Result<()> {
    let input = points(&[(3000, 3.0), (1000, 1.0), (2000, 2.0), (1000, 9.0)]);

    let inserted = chart_data_queries::replace_for_pair(&pool, SYMBOL, Timeframe::OneDay, &input).await?;
    assert_eq!(inserted, 3);

    let rows = chart_data_queries::fetch_for_pair(&pool, SYMBOL, Timeframe::OneDay).await?;
    let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![1000, 2000, 3000]);
    assert_eq!(rows[1].close, 2.0);
    assert_eq!(rows[1].timeframe, Timeframe::OneDay);
    assert!((rows[2].high - 3.0 * 1.001).abs() < 1e-12);

    let latest = chart_data_queries::fetch_latest(&pool, SYMBOL, Timeframe::OneDay).await?;
    assert_eq!(latest.map(|r| r.timestamp), Some(3000));
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_replace_discards_previous_rows_of_partition_only(pool: PgPool) -> sqlx::Result<()> {
    chart_data_queries::replace_for_pair(&pool, SYMBOL, Timeframe::OneDay, &points(&[(1000, 1.0), (2000, 2.0)]))
        .await?;
    chart_data_queries::replace_for_pair(&pool, SYMBOL, Timeframe::OneWeek, &points(&[(500, 5.0)])).await?;
    chart_data_queries::replace_for_pair(&pool, "USDT/USD", Timeframe::OneDay, &points(&[(1000, 1.0)])).await?;

    let inserted =
        chart_data_queries::replace_for_pair(&pool, SYMBOL, Timeframe::OneDay, &points(&[(4000, 4.0)])).await?;
    assert_eq!(inserted, 1);

    let rows = chart_data_queries::fetch_for_pair(&pool, SYMBOL, Timeframe::OneDay).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].timestamp, 4000);

    assert_eq!(chart_data_queries::fetch_for_pair(&pool, SYMBOL, Timeframe::OneWeek).await?.len(), 1);
    assert_eq!(chart_data_queries::fetch_for_pair(&pool, "USDT/USD", Timeframe::OneDay).await?.len(), 1);

    // An empty series clears the partition
    let inserted = chart_data_queries::replace_for_pair(&pool, SYMBOL, Timeframe::OneDay, &[]).await?;
    assert_eq!(inserted, 0);
    assert!(chart_data_queries::fetch_for_pair(&pool, SYMBOL, Timeframe::OneDay).await?.is_empty());
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_failed_insert_keeps_previous_rows(pool: PgPool) -> sqlx::Result<()> {
    chart_data_queries::replace_for_pair(&pool, SYMBOL, Timeframe::OneDay, &points(&[(1000, 1.0), (2000, 2.0)]))
        .await?;

    sqlx::query("ALTER TABLE chart_data ADD CONSTRAINT close_positive CHECK (close > 0)")
        .execute(&pool)
        .await?;

    let result =
        chart_data_queries::replace_for_pair(&pool, SYMBOL, Timeframe::OneDay, &points(&[(3000, 3.0), (4000, -1.0)]))
            .await;
    assert!(result.is_err());

    let rows = chart_data_queries::fetch_for_pair(&pool, SYMBOL, Timeframe::OneDay).await?;
    let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![1000, 2000]);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_upsert_updates_in_place(pool: PgPool) -> sqlx::Result<()> {
    let day_one = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let day_two = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

    let first = price_feed_queries::upsert(&pool, &feed(1.0 / 16000.0, day_one)).await?;
    assert_eq!(first.amount, 1);

    let second = price_feed_queries::upsert(&pool, &feed(1.0 / 15000.0, day_two)).await?;
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(second.rate, 1.0 / 15000.0);
    assert_eq!(second.date, day_two);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM price_feeds WHERE base = 'USD' AND target = 'IDR'")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 1);

    let fetched = price_feed_queries::fetch(&pool, "USD", "IDR").await?;
    assert_eq!(fetched.map(|f| f.rate), Some(1.0 / 15000.0));
    assert!(price_feed_queries::fetch(&pool, "IDR", "USD").await?.is_none());
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_store_serves_latest_point(pool: PgPool) -> sqlx::Result<()> {
    let store = PgPriceStore::new(pool);
    assert!(store.fetch_latest_chart_point(SYMBOL, Timeframe::OneDay).await?.is_none());

    store
        .replace_chart_data(SYMBOL, Timeframe::OneDay, &points(&[(1000, 15500.0), (2000, 16000.0)]))
        .await?;
    let latest = store.fetch_latest_chart_point(SYMBOL, Timeframe::OneDay).await?;
    assert_eq!(latest.map(|r| r.close), Some(16000.0));
    Ok(())
}
