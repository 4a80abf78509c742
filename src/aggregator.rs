//! # Aggregator
//! Fans out to every source adapter concurrently, waits for all of them,
//! merges in declaration order, then applies the optional filter and sort.
//!
//! Each adapter runs as its own spawned task. A failing or panicking adapter
//! contributes nothing and never affects the others. If the caller is
//! dropped mid-flight the tasks still run to completion, so their results
//! still land in the cache.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;

use crate::cache::MemoryCache;
use crate::config::AppConfig;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::record::AggregatedRecord;
use crate::sources::{self, RecordCache, SourceAdapter};

/// Recognized `sortBy` values (case-insensitive). Anything else is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Source,
    Date,
    Category,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "source" => Some(Self::Source),
            "date" => Some(Self::Date),
            "category" => Some(Self::Category),
            _ => None,
        }
    }

    fn compare(self, a: &AggregatedRecord, b: &AggregatedRecord) -> Ordering {
        match self {
            Self::Source => a.source().cmp(b.source()),
            Self::Date => a.timestamp().cmp(&b.timestamp()),
            Self::Category => a.category().cmp(b.category()),
        }
    }
}

pub struct Aggregator {
    sources: Vec<Arc<dyn SourceAdapter>>,
}

impl Aggregator {
    /// Sources are merged in exactly this order.
    pub fn new(sources: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { sources }
    }

    /// Weather, News and GitHub adapters over the given transport and cache.
    pub fn with_defaults(cfg: &AppConfig, http: Arc<dyn HttpClient>, cache: RecordCache) -> Self {
        Self::new(sources::default_sources(cfg, http, cache))
    }

    /// Production wiring: reqwest transport and a fresh in-memory cache.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let http = ReqwestHttpClient::new(&cfg.user_agent, cfg.http_timeout())?;
        let cache: MemoryCache<Vec<AggregatedRecord>> = MemoryCache::new();
        Ok(Self::with_defaults(cfg, Arc::new(http), Arc::new(cache)))
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Merged, filtered and sorted records. Never fails; upstream problems
    /// only shrink the result.
    pub async fn aggregate(
        &self,
        filter: Option<&str>,
        sort_by: Option<&str>,
    ) -> Vec<AggregatedRecord> {
        let t0 = Instant::now();

        let merged = self.fetch_all().await;
        let fetched = merged.len();
        let filtered = apply_filter(merged, filter);
        let out = apply_sort(filtered, sort_by.and_then(SortKey::parse));

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("aggregate_duration_ms").record(ms);
        tracing::info!(
            fetched,
            returned = out.len(),
            filter = filter.unwrap_or(""),
            sort_by = sort_by.unwrap_or(""),
            elapsed_ms = ms,
            "aggregate"
        );

        out
    }

    /// Spawn every fetch, then join the handles in declaration order so
    /// completion order never leaks into the output.
    async fn fetch_all(&self) -> Vec<AggregatedRecord> {
        let handles: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                let name = source.name();
                (name, tokio::spawn(async move { source.fetch().await }))
            })
            .collect();

        let mut merged = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(mut records) => merged.append(&mut records),
                Err(e) => {
                    tracing::error!(source = name, error = %e, "source task failed");
                }
            }
        }
        merged
    }
}

/// Keep records whose `source` contains `filter`, ignoring case.
/// `None` or an empty filter keeps everything.
pub fn apply_filter(records: Vec<AggregatedRecord>, filter: Option<&str>) -> Vec<AggregatedRecord> {
    match filter.filter(|f| !f.is_empty()) {
        Some(f) => {
            let needle = f.to_lowercase();
            records
                .into_iter()
                .filter(|r| r.source().to_lowercase().contains(&needle))
                .collect()
        }
        None => records,
    }
}

/// Stable ascending sort; `None` leaves the order untouched.
pub fn apply_sort(mut records: Vec<AggregatedRecord>, key: Option<SortKey>) -> Vec<AggregatedRecord> {
    if let Some(key) = key {
        records.sort_by(|a, b| key.compare(a, b));
    }
    records
}
