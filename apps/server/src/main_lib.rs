use std::sync::Arc;

use crate::config::Config;
use farescout_flights::FlightAggregator;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub aggregator: FlightAggregator,
}

/// Install the global subscriber. `FS_LOG_FORMAT=text` switches from JSON
/// lines to human-readable output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let text = std::env::var("FS_LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("text"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if text {
        registry.with(fmt::layer()).init();
    } else {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    }
}

pub fn build_state(config: &Config) -> Arc<AppState> {
    tracing::info!("Fare API in use: {}", config.api_base_url);
    let aggregator = FlightAggregator::new(config.aggregator_config());
    Arc::new(AppState { aggregator })
}
