// src/sources/mod.rs
pub mod cached;
pub mod providers;
pub mod types;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

pub use cached::{CachedSource, RecordCache};
pub use providers::{github::GitHubSource, news::NewsSource, weather::WeatherSource};
pub use types::{SourceAdapter, Upstream};

use crate::error::FetchError;
use crate::http_client::HttpRequest;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("source_cache_hits_total", "Adapter fetches served from cache.");
        describe_counter!(
            "source_cache_misses_total",
            "Adapter fetches that went upstream."
        );
        describe_counter!(
            "source_fetch_errors_total",
            "Adapter fetches that ended empty because of an error."
        );
        describe_counter!(
            "source_records_total",
            "Records normalized from fresh upstream payloads."
        );
        describe_histogram!(
            "aggregate_duration_ms",
            "Wall time of one aggregate call in milliseconds."
        );
        describe_gauge!("source_cache_ttl_secs", "TTL applied to adapter cache entries.");
    });
}

/// Build a GET for `base_url` with the given query, failing on a bad base URL.
pub(crate) fn build_get(
    base_url: &str,
    params: &[(&str, &str)],
    user_agent: &str,
) -> Result<HttpRequest, FetchError> {
    let url = reqwest::Url::parse_with_params(base_url, params)
        .map_err(|e| FetchError::InvalidConfig(format!("base url '{base_url}': {e}")))?;
    Ok(HttpRequest::get(url.as_str()).with_header("user-agent", user_agent))
}

/// Return the credential if it is present and non-blank.
pub(crate) fn require_key<'a>(
    key: Option<&'a str>,
    name: &'static str,
) -> Result<&'a str, FetchError> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(FetchError::MissingConfig(name))
}

/// Lenient RFC 3339 parsing; absent or malformed values map to the epoch.
pub(crate) fn parse_timestamp(ts: Option<&str>) -> DateTime<Utc> {
    ts.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Sources in their fixed merge order: Weather, News, RepositorySearch.
pub fn default_sources(
    cfg: &crate::config::AppConfig,
    http: Arc<dyn crate::http_client::HttpClient>,
    cache: RecordCache,
) -> Vec<Arc<dyn SourceAdapter>> {
    let ttl = cfg.cache_ttl();
    vec![
        Arc::new(CachedSource::new(
            WeatherSource::from_config(&cfg.weather, &cfg.user_agent),
            Arc::clone(&http),
            Arc::clone(&cache),
            ttl,
        )),
        Arc::new(CachedSource::new(
            NewsSource::from_config(&cfg.news, &cfg.user_agent),
            Arc::clone(&http),
            Arc::clone(&cache),
            ttl,
        )),
        Arc::new(CachedSource::new(
            GitHubSource::from_config(&cfg.github, &cfg.user_agent),
            http,
            cache,
            ttl,
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_parse_leniently() {
        assert_eq!(
            parse_timestamp(Some("2024-03-01T10:20:30Z")),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 20, 30).unwrap()
        );
        assert_eq!(
            parse_timestamp(Some("2024-03-01T12:20:30+02:00")),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 20, 30).unwrap()
        );
        assert_eq!(parse_timestamp(Some("yesterday")), DateTime::<Utc>::default());
        assert_eq!(parse_timestamp(None), DateTime::<Utc>::default());
    }

    #[test]
    fn blank_keys_count_as_missing() {
        assert!(matches!(
            require_key(Some("   "), "X"),
            Err(FetchError::MissingConfig("X"))
        ));
        assert!(require_key(None, "X").is_err());
        assert_eq!(require_key(Some(" k "), "X").unwrap(), "k");
    }

    #[test]
    fn build_get_encodes_query_and_sets_agent() {
        let req = build_get(
            "https://api.example.test/search",
            &[("q", "language:rust"), ("sort", "stars")],
            "agent/1",
        )
        .unwrap();
        assert_eq!(
            req.url,
            "https://api.example.test/search?q=language%3Arust&sort=stars"
        );
        assert_eq!(req.headers.get("user-agent").map(String::as_str), Some("agent/1"));
    }

    #[test]
    fn build_get_rejects_relative_base() {
        let err = build_get("not a url", &[], "a").unwrap_err();
        assert_eq!(err.kind(), "invalid_config");
    }
}
