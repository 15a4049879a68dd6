pub(crate) mod body;
pub(crate) mod chart_data;
pub(crate) mod health;
pub(crate) mod price_feed;
pub(crate) mod script;
