use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use rwa_price_backend::app;
use rwa_price_backend::config::{AppConfig, StoreKind};
use rwa_price_backend::external::coingecko::CoinGeckoSource;
use rwa_price_backend::external::price_source::PriceSource;
use rwa_price_backend::logging::{init_logging, LoggingConfig};
use rwa_price_backend::services::job_scheduler_service::{JobContext, JobSchedulerService};
use rwa_price_backend::state::AppState;
use rwa_price_backend::store::{MemoryPriceStore, PgPriceStore, PriceStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let store: Arc<dyn PriceStore> = match config.store {
        StoreKind::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to database")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;

            tracing::info!("🗄️ Using Postgres price store");
            Arc::new(PgPriceStore::new(pool))
        }
        StoreKind::Memory => {
            tracing::warn!("🧪 Using in-memory price store; data is lost on restart");
            Arc::new(MemoryPriceStore::new())
        }
    };

    tracing::info!(
        "📊 Price source: {} ({} symbols)",
        config.source.base_url,
        config.source.symbols.len()
    );
    let price_source: Arc<dyn PriceSource> = Arc::new(CoinGeckoSource::new(config.source.clone()));

    if config.auth.session_secret.is_none() {
        tracing::warn!("SESSION_SECRET is not set; POST /api/chart-data will reject every request");
    }
    if config.auth.script_api_key.is_none() {
        tracing::warn!("SCRIPT_API_KEY is not set; POST /api/script/update-prices will reject every request");
    }

    // Held for the lifetime of the server so scheduled jobs keep running
    let mut scheduler = match config.sync_cron.as_deref() {
        Some(schedule) => {
            let mut scheduler = JobSchedulerService::new(JobContext {
                store: store.clone(),
                price_source: price_source.clone(),
                defaults: config.defaults.clone(),
            })
            .await?;
            scheduler.start(schedule).await?;
            Some(scheduler)
        }
        None => None,
    };

    let state = AppState {
        store,
        price_source,
        auth: Arc::new(config.auth.clone()),
        defaults: config.defaults.clone(),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("🚀 RWA price backend running at http://{}/", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.stop().await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
