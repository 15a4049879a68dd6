use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;

use crate::models::{SymbolPair, Timeframe};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// Lookup tables for the external charting endpoint. Built once at startup and
/// handed to the client.
#[derive(Debug, Clone)]
pub struct PriceSourceConfig {
    pub base_url: String,
    /// Upper-case ticker -> source coin id.
    pub symbols: HashMap<String, String>,
    pub periods: HashMap<Timeframe, String>,
}

impl PriceSourceConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.coingecko.com/price_charts";
    pub const DEFAULT_SYMBOLS: &'static str = "IDRX=idrx,USDT=tether,USDC=usd-coin";
    const SHORTEST_PERIOD: &'static str = "24_hours";

    pub fn default_periods() -> HashMap<Timeframe, String> {
        [
            (Timeframe::OneDay, "24_hours"),
            (Timeframe::OneWeek, "7_days"),
            (Timeframe::OneMonth, "30_days"),
            (Timeframe::ThreeMonths, "90_days"),
            (Timeframe::OneYear, "365_days"),
            (Timeframe::All, "max"),
        ]
        .into_iter()
        .map(|(tf, period)| (tf, period.to_string()))
        .collect()
    }

    pub fn coin_id(&self, symbol: &str) -> Option<&str> {
        self.symbols.get(&symbol.trim().to_uppercase()).map(String::as_str)
    }

    /// Period token for a timeframe. Anything missing from the table falls back
    /// to the shortest period.
    pub fn period(&self, timeframe: Timeframe) -> &str {
        self.periods
            .get(&timeframe)
            .or_else(|| self.periods.get(&Timeframe::OneDay))
            .map(String::as_str)
            .unwrap_or(Self::SHORTEST_PERIOD)
    }
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            // The default table is a literal and always parses.
            symbols: parse_symbol_map(Self::DEFAULT_SYMBOLS).unwrap_or_default(),
            periods: Self::default_periods(),
        }
    }
}

/// Pair synced and priced when a request or the scheduled job names nothing.
#[derive(Debug, Clone)]
pub struct PriceFeedDefaults {
    pub symbol: SymbolPair,
    pub base: String,
    pub target: String,
}

impl Default for PriceFeedDefaults {
    fn default() -> Self {
        Self {
            symbol: SymbolPair::new("IDRX", "USD"),
            base: "USD".to_string(),
            target: "IDR".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub session_secret: Option<String>,
    pub script_api_key: Option<String>,
}

// Secrets stay out of Debug output.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_secret", &self.session_secret.as_ref().map(|_| "<redacted>"))
            .field("script_api_key", &self.script_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    pub source: PriceSourceConfig,
    pub defaults: PriceFeedDefaults,
    pub sync_cron: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so it can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match var("PRICE_STORE").unwrap_or_else(|| "postgres".to_string()).to_lowercase().as_str() {
            "postgres" => StoreKind::Postgres,
            "memory" => StoreKind::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "PRICE_STORE",
                    reason: format!("'{}' is not 'postgres' or 'memory'", other),
                })
            }
        };

        let database_url = var("DATABASE_URL");
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                reason: e.to_string(),
            })?,
            None => 10,
        };

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let base_url = var("PRICE_SOURCE_URL")
            .unwrap_or_else(|| PriceSourceConfig::DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
            name: "PRICE_SOURCE_URL",
            reason: e.to_string(),
        })?;

        let symbols = parse_symbol_map(
            &var("PRICE_SOURCE_SYMBOLS").unwrap_or_else(|| PriceSourceConfig::DEFAULT_SYMBOLS.to_string()),
        )?;

        let defaults = PriceFeedDefaults {
            symbol: var("PRICE_FEED_SYMBOL")
                .unwrap_or_else(|| "IDRX/USD".to_string())
                .parse::<SymbolPair>()
                .map_err(|reason| ConfigError::Invalid { name: "PRICE_FEED_SYMBOL", reason })?,
            base: var("PRICE_FEED_BASE").unwrap_or_else(|| "USD".to_string()).to_uppercase(),
            target: var("PRICE_FEED_TARGET").unwrap_or_else(|| "IDR".to_string()).to_uppercase(),
        };

        Ok(Self {
            store,
            database_url,
            database_max_connections,
            bind_addr,
            auth: AuthConfig {
                session_secret: var("SESSION_SECRET"),
                script_api_key: var("SCRIPT_API_KEY"),
            },
            source: PriceSourceConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                symbols,
                periods: PriceSourceConfig::default_periods(),
            },
            defaults,
            sync_cron: var("PRICE_SYNC_CRON"),
        })
    }
}

/// Parses `SYMBOL=coin-id` pairs separated by commas.
fn parse_symbol_map(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((symbol, id)) if !symbol.trim().is_empty() && !id.trim().is_empty() => {
                Ok((symbol.trim().to_uppercase(), id.trim().to_string()))
            }
            _ => Err(ConfigError::Invalid {
                name: "PRICE_SOURCE_SYMBOLS",
                reason: format!("expected SYMBOL=id, got '{}'", entry),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_memory_store_needs_no_database() {
        let config = AppConfig::from_lookup(lookup(&[("PRICE_STORE", "memory")])).unwrap();
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.defaults.symbol.to_string(), "IDRX/USD");
        assert_eq!(config.source.coin_id("idrx"), Some("idrx"));
        assert!(config.sync_cron.is_none());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AppConfig::from_lookup(lookup(&[("PRICE_STORE", "redis")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[
            ("PRICE_STORE", "memory"),
            ("PRICE_SOURCE_SYMBOLS", "IDRX"),
        ]))
        .is_err());
        assert!(AppConfig::from_lookup(lookup(&[
            ("PRICE_STORE", "memory"),
            ("PRICE_FEED_SYMBOL", "IDRX"),
        ]))
        .is_err());
    }

    #[test]
    fn test_custom_symbols_replace_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PRICE_STORE", "memory"),
            ("PRICE_SOURCE_SYMBOLS", "btc=bitcoin, eth=ethereum"),
        ]))
        .unwrap();
        assert_eq!(config.source.coin_id("BTC"), Some("bitcoin"));
        assert_eq!(config.source.coin_id("ETH"), Some("ethereum"));
        assert_eq!(config.source.coin_id("IDRX"), None);
    }

    #[test]
    fn test_period_falls_back_to_shortest() {
        let mut source = PriceSourceConfig::default();
        assert_eq!(source.period(Timeframe::All), "max");

        source.periods.remove(&Timeframe::ThreeMonths);
        assert_eq!(source.period(Timeframe::ThreeMonths), "24_hours");

        source.periods.clear();
        assert_eq!(source.period(Timeframe::OneYear), "24_hours");
    }

    #[test]
    fn test_auth_debug_redacts_secrets() {
        let auth = AuthConfig {
            session_secret: Some("s3cret".into()),
            script_api_key: Some("k3y".into()),
        };
        let printed = format!("{:?}", auth);
        assert!(!printed.contains("s3cret"));
        assert!(!printed.contains("k3y"));
    }
}
