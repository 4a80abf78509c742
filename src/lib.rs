// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http_client;
pub mod metrics;
pub mod record;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{Aggregator, SortKey};
pub use crate::api::{create_router, AppState};
pub use crate::cache::{CacheStore, MemoryCache};
pub use crate::config::AppConfig;
pub use crate::error::FetchError;
pub use crate::http_client::{HttpClient, ReqwestHttpClient, StubHttpClient};
pub use crate::record::AggregatedRecord;
pub use crate::sources::SourceAdapter;

use anyhow::Context;
use axum::Router;

/// Build the full in-process app: load config, wire adapters over the real
/// transport, and expose the API plus `/metrics`.
pub fn app() -> anyhow::Result<Router> {
    let cfg = AppConfig::load().context("loading aggregator config")?;
    cfg.log_summary();

    let metrics = metrics::Metrics::init(cfg.cache_ttl_secs).context("installing metrics recorder")?;
    let aggregator = Aggregator::from_config(&cfg).context("building aggregator")?;

    Ok(api::create_router(AppState::new(aggregator)).merge(metrics.router()))
}
