use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregator::Aggregator;
use crate::record::AggregatedRecord;

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/aggregator/aggregated-data", get(aggregated_data))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct AggregateQuery {
    filter: Option<String>,
    sort: Option<String>,
}

impl AggregateQuery {
    /// First value of each key wins; `sort` takes precedence over `sortBy`.
    /// Repeated or unknown keys never reject the request.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        Self {
            filter: first("filter"),
            sort: first("sort").or_else(|| first("sortBy")),
        }
    }
}

async fn aggregated_data(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<Vec<AggregatedRecord>> {
    let q = AggregateQuery::from_pairs(pairs);
    let records = state
        .aggregator()
        .aggregate(q.filter.as_deref(), q.sort.as_deref())
        .await;
    Json(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn sort_wins_over_sort_by_and_first_value_wins() {
        let q = AggregateQuery::from_pairs(pairs(&[
            ("sortBy", "category"),
            ("filter", "git"),
            ("sort", "date"),
            ("filter", "news"),
            ("sort", "source"),
        ]));
        assert_eq!(q.filter.as_deref(), Some("git"));
        assert_eq!(q.sort.as_deref(), Some("date"));
    }

    #[test]
    fn sort_by_alone_is_used_and_unknown_keys_are_ignored() {
        let q = AggregateQuery::from_pairs(pairs(&[("sortBy", "category"), ("page", "2")]));
        assert_eq!(q.sort.as_deref(), Some("category"));
        assert_eq!(q.filter, None);
        assert_eq!(AggregateQuery::from_pairs(Vec::new()), AggregateQuery::default());
    }
}
