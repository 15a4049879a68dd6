use std::sync::Arc;

use crate::config::{AuthConfig, PriceFeedDefaults};
use crate::external::price_source::PriceSource;
use crate::store::PriceStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PriceStore>,
    pub price_source: Arc<dyn PriceSource>,
    pub auth: Arc<AuthConfig>,
    pub defaults: PriceFeedDefaults,
}
