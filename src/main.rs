//! API Aggregation Service — Binary Entrypoint
//! Boots the Axum HTTP server with the aggregator, its adapters and metrics.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs, filtered by `RUST_LOG` when set.
/// Uses `try_init` so a subscriber installed by the hosting runtime wins.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("api_aggregation_service=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // Provides WEATHER_API_KEY / NEWS_API_KEY and the AGGREGATOR_* overrides.
    let _ = dotenvy::dotenv();

    init_tracing();

    let router = api_aggregation_service::app()?;
    Ok(router.into())
}
