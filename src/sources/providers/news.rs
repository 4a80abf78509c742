// src/sources/providers/news.rs
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::NewsConfig;
use crate::error::FetchError;
use crate::http_client::HttpRequest;
use crate::record::AggregatedRecord;
use crate::sources::types::Upstream;
use crate::sources::{build_get, parse_timestamp, require_key};

pub const SOURCE: &str = "NewsAPI";
pub const CATEGORY: &str = "News";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: Option<String>,
    total_results: Option<u64>,
    articles: Option<Vec<NewsArticle>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsArticle {
    title: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
}

/// NewsAPI top headlines for one country; one record per article.
#[derive(Debug, Clone)]
pub struct NewsSource {
    base_url: String,
    country: String,
    api_key: Option<String>,
    user_agent: String,
}

impl NewsSource {
    pub fn from_config(cfg: &NewsConfig, user_agent: &str) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            country: cfg.country.clone(),
            api_key: cfg.api_key.as_ref().map(|k| k.expose().to_string()),
            user_agent: user_agent.to_string(),
        }
    }
}

impl Upstream for NewsSource {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn request(&self) -> Result<HttpRequest, FetchError> {
        let key = require_key(self.api_key.as_deref(), "NEWS_API_KEY")?;
        build_get(
            &self.base_url,
            &[("country", self.country.as_str()), ("apiKey", key)],
            &self.user_agent,
        )
    }

    fn normalize(
        &self,
        body: &str,
        _fetched_at: DateTime<Utc>,
    ) -> Result<Vec<AggregatedRecord>, FetchError> {
        let resp: NewsApiResponse = serde_json::from_str(body)?;

        let Some(articles) = resp.articles else {
            tracing::warn!(
                source = SOURCE,
                status = resp.status.as_deref().unwrap_or(""),
                "news api returned no article list"
            );
            return Ok(Vec::new());
        };
        tracing::debug!(
            source = SOURCE,
            total = resp.total_results.unwrap_or_default(),
            returned = articles.len(),
            "news articles decoded"
        );

        Ok(articles
            .into_iter()
            .map(|a| {
                let payload = format!(
                    "{} - {}",
                    a.title.as_deref().unwrap_or_default(),
                    a.description.as_deref().unwrap_or_default()
                );
                AggregatedRecord::new(
                    SOURCE,
                    CATEGORY,
                    parse_timestamp(a.published_at.as_deref()),
                    payload,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, AppConfig};
    use chrono::TimeZone;

    fn source() -> NewsSource {
        let mut cfg = AppConfig::default();
        cfg.news.api_key = Some(ApiKey::new("nk"));
        NewsSource::from_config(&cfg.news, "test-agent")
    }

    #[test]
    fn request_embeds_country_and_key() {
        let req = source().request().unwrap();
        assert_eq!(req.url, "https://newsapi.org/v2/top-headlines?country=us&apiKey=nk");
    }

    #[test]
    fn one_record_per_article_with_publication_time() {
        let body = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"id": null, "name": "AP"}, "title": "Markets rally",
                 "description": "Stocks up", "publishedAt": "2024-06-01T08:30:00Z"},
                {"title": "No description", "description": null,
                 "publishedAt": "2024-06-02T09:00:00Z", "urlToImage": null}
            ]
        }"#;
        let out = source().normalize(body, Utc::now()).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source(), "NewsAPI");
        assert_eq!(out[0].category(), "News");
        assert_eq!(out[0].payload(), "Markets rally - Stocks up");
        assert_eq!(
            out[0].timestamp(),
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
        );
        assert_eq!(out[1].payload(), "No description - ");
    }

    #[test]
    fn absent_or_empty_article_list_is_empty() {
        assert!(source().normalize(r#"{"status":"ok"}"#, Utc::now()).unwrap().is_empty());
        assert!(source()
            .normalize(r#"{"status":"ok","articles":[]}"#, Utc::now())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let err = source().normalize("{not json", Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "decode");
    }
}
