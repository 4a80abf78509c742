// src/sources/providers/github.rs
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::GitHubConfig;
use crate::error::FetchError;
use crate::http_client::HttpRequest;
use crate::record::AggregatedRecord;
use crate::sources::types::Upstream;
use crate::sources::{build_get, parse_timestamp};

pub const SOURCE: &str = "GitHub";
pub const CATEGORY: &str = "Repository";

#[derive(Debug, Deserialize)]
struct GitHubSearchResponse {
    items: Option<Vec<Repository>>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    name: Option<String>,
    description: Option<String>,
    stargazers_count: Option<u64>,
    created_at: Option<String>,
}

/// GitHub repository search; one record per returned repository.
/// Needs no credential, but GitHub rejects requests without a user agent.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    base_url: String,
    query: String,
    sort: String,
    order: String,
    user_agent: String,
}

impl GitHubSource {
    pub fn from_config(cfg: &GitHubConfig, user_agent: &str) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            query: cfg.query.clone(),
            sort: cfg.sort.clone(),
            order: cfg.order.clone(),
            user_agent: user_agent.to_string(),
        }
    }
}

impl Upstream for GitHubSource {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn request(&self) -> Result<HttpRequest, FetchError> {
        let req = build_get(
            &self.base_url,
            &[
                ("q", self.query.as_str()),
                ("sort", self.sort.as_str()),
                ("order", self.order.as_str()),
            ],
            &self.user_agent,
        )?;
        Ok(req.with_header("accept", "application/vnd.github+json"))
    }

    fn normalize(
        &self,
        body: &str,
        _fetched_at: DateTime<Utc>,
    ) -> Result<Vec<AggregatedRecord>, FetchError> {
        let resp: GitHubSearchResponse = serde_json::from_str(body)?;

        Ok(resp
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|repo| {
                let payload = format!(
                    "{} - {} (Stars: {})",
                    repo.name.as_deref().unwrap_or_default(),
                    repo.description.as_deref().unwrap_or_default(),
                    repo.stargazers_count.unwrap_or_default()
                );
                AggregatedRecord::new(
                    SOURCE,
                    CATEGORY,
                    parse_timestamp(repo.created_at.as_deref()),
                    payload,
                )
            })
            .collect())
    }
}
