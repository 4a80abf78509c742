// src/sources/types.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FetchError;
use crate::http_client::HttpRequest;
use crate::record::AggregatedRecord;

/// What the aggregator fans out to. `fetch` never fails: every error is
/// logged inside the adapter and turned into an empty sequence.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self) -> Vec<AggregatedRecord>;
    fn name(&self) -> &'static str;
}

/// One upstream API: how to ask it, and how to read its answer.
/// Wrapped by [`super::CachedSource`], which owns transport, caching and
/// error conversion.
pub trait Upstream: Send + Sync + 'static {
    /// Source identifier stamped on every record (e.g. "NewsAPI").
    fn name(&self) -> &'static str;

    /// Fully resolved request. The URL doubles as the cache key.
    fn request(&self) -> Result<HttpRequest, FetchError>;

    /// Decode a 2xx body into records. `fetched_at` is used where the
    /// upstream carries no per-item time.
    fn normalize(
        &self,
        body: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<AggregatedRecord>, FetchError>;
}
