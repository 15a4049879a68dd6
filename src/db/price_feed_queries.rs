use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{PriceFeedRecord, UpsertPriceFeed};

pub async fn upsert(
    pool: &PgPool,
    feed: &UpsertPriceFeed,
) -> Result<PriceFeedRecord, sqlx::Error> {
    sqlx::query_as::<_, PriceFeedRecord>(
        r#"
        INSERT INTO price_feeds (id, base, target, rate, amount, date)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (base, target)
        DO UPDATE SET rate = EXCLUDED.rate,
                      amount = EXCLUDED.amount,
                      date = EXCLUDED.date,
                      updated_at = NOW()
        RETURNING id, base, target, rate, amount, date, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&feed.base)
    .bind(&feed.target)
    .bind(feed.rate)
    .bind(UpsertPriceFeed::AMOUNT)
    .bind(feed.date)
    .fetch_one(pool)
    .await
}

pub async fn fetch(
    pool: &PgPool,
    base: &str,
    target: &str,
) -> Result<Option<PriceFeedRecord>, sqlx::Error> {
    sqlx::query_as::<_, PriceFeedRecord>(
        r#"
        SELECT id, base, target, rate, amount, date, created_at, updated_at
        FROM price_feeds
        WHERE base = $1 AND target = $2
        "#,
    )
    .bind(base)
    .bind(target)
    .fetch_optional(pool)
    .await
}
