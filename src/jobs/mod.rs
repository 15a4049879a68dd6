//! Background jobs run by `JobSchedulerService`.
//!
//! - `update_prices_job` - syncs every chart timeframe of the default pair and
//!   recomputes its price feed

pub mod update_prices_job;
