// src/sources/cached.rs
//! Uniform fetch path shared by every adapter:
//! key → cache check → upstream call → normalize → cache store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;

use crate::cache::CacheStore;
use crate::error::FetchError;
use crate::http_client::HttpClient;
use crate::record::AggregatedRecord;
use crate::sources::types::{SourceAdapter, Upstream};

/// Cache shared by all adapters, keyed by full request URL.
pub type RecordCache = Arc<dyn CacheStore<Vec<AggregatedRecord>>>;

/// Wraps an [`Upstream`] with transport, caching and error isolation.
///
/// A cache hit never touches the network. Only 2xx payloads that decode are
/// stored, including empty ones. Concurrent misses on one key are not
/// coalesced; both fetch and the last `set` wins.
pub struct CachedSource<U: Upstream> {
    upstream: U,
    http: Arc<dyn HttpClient>,
    cache: RecordCache,
    ttl: Duration,
}

impl<U: Upstream> CachedSource<U> {
    pub fn new(upstream: U, http: Arc<dyn HttpClient>, cache: RecordCache, ttl: Duration) -> Self {
        super::ensure_metrics_described();
        Self {
            upstream,
            http,
            cache,
            ttl,
        }
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    async fn fetch_impl(&self) -> Result<Vec<AggregatedRecord>, FetchError> {
        let source = self.upstream.name();

        // 1) Resolve request; its URL is the cache key.
        let request = self.upstream.request()?;
        let key = request.url.clone();

        // 2) Cache lookup.
        if let Some(hit) = self.cache.get(&key) {
            counter!("source_cache_hits_total", "source" => source).increment(1);
            tracing::debug!(source, records = hit.len(), "cache hit");
            return Ok(hit);
        }
        counter!("source_cache_misses_total", "source" => source).increment(1);

        // 3) Real call.
        let response = self.http.send(request).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
                body: response.body,
            });
        }

        // 4) Normalize + store.
        let records = self.upstream.normalize(&response.body, Utc::now())?;
        counter!("source_records_total", "source" => source).increment(records.len() as u64);
        self.cache.set(key, records.clone(), self.ttl);
        tracing::debug!(source, records = records.len(), "fetched and cached");

        Ok(records)
    }
}

#[async_trait]
impl<U: Upstream> SourceAdapter for CachedSource<U> {
    async fn fetch(&self) -> Vec<AggregatedRecord> {
        let source = self.upstream.name();
        match self.fetch_impl().await {
            Ok(records) => records,
            Err(e) => {
                counter!("source_fetch_errors_total", "source" => source, "kind" => e.kind())
                    .increment(1);
                match &e {
                    FetchError::Status { status, body } => tracing::error!(
                        source,
                        status = *status,
                        body = %body,
                        "upstream returned non-success status"
                    ),
                    _ => tracing::error!(source, kind = e.kind(), error = %e, "fetch failed"),
                }
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        self.upstream.name()
    }
}
