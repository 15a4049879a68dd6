use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Quiets the HTTP client and scheduler internals; request traces stay on.
pub const DEFAULT_FILTER: &str =
    "info,rwa_price_backend=info,tower_http=info,sqlx=warn,hyper=warn,reqwest=warn,tokio_cron_scheduler=warn";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    /// Default pair this instance syncs, attached as the Loki `symbol` label.
    pub price_symbol: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            loki_enabled: std::env::var("LOKI_ENABLED")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            loki_url: std::env::var("LOKI_URL").ok().filter(|u| !u.trim().is_empty()),
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "rwa-price-backend".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            price_symbol: std::env::var("PRICE_FEED_SYMBOL")
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_else(|_| "IDRX/USD".to_string()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.loki_enabled {
            return Ok(());
        }
        let url = self
            .loki_url
            .as_deref()
            .ok_or_else(|| "LOKI_ENABLED is true but LOKI_URL is not set".to_string())?;
        url::Url::parse(url).map_err(|e| format!("LOKI_URL {} is not a valid URL: {}", url, e))?;
        Ok(())
    }

    fn filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        EnvFilter::try_new(&self.log_level)
    }
}

pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    #[cfg(feature = "loki")]
    {
        if let (true, Some(loki_url)) = (config.loki_enabled, config.loki_url.clone()) {
            return init_with_loki(config, &loki_url);
        }
    }

    tracing_subscriber::registry()
        .with(config.filter()?)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::info!(
        "📊 Console logging initialized for {} ({}, {})",
        config.service_name,
        config.environment,
        config.price_symbol
    );
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(config: LoggingConfig, loki_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (loki_layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .label("symbol", &config.price_symbol)?
        .build_url(url::Url::parse(loki_url)?)?;

    // Ships buffered events to Loki
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(config.filter()?)
        .with(tracing_subscriber::fmt::layer())
        .with(loki_layer)
        .try_init()?;

    tracing::info!("✅ Loki logging initialized at {} for {}", loki_url, config.price_symbol);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(loki_enabled: bool, loki_url: Option<&str>) -> LoggingConfig {
        LoggingConfig {
            loki_enabled,
            loki_url: loki_url.map(str::to_string),
            service_name: "rwa-price-backend".into(),
            environment: "test".into(),
            price_symbol: "IDRX/USD".into(),
            log_level: DEFAULT_FILTER.into(),
        }
    }

    #[test]
    fn test_loki_requires_valid_url() {
        assert!(config(true, None).validate().is_err());
        assert!(config(true, Some("not a url")).validate().is_err());
        assert!(config(true, Some("http://loki:3100")).validate().is_ok());
        assert!(config(false, None).validate().is_ok());
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(config(false, None).filter().is_ok());
    }
}
