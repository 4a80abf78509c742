//! # Aggregated Record
//! The common unit every source adapter normalizes into.
//!
//! Records are built once through [`AggregatedRecord::new`] and never
//! mutated afterwards; the aggregator only reorders and filters them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized item from any upstream source.
///
/// Serialized with the field names the HTTP surface has always used:
/// `source`, `category`, `date`, `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    source: String,
    category: String,
    #[serde(rename = "date")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "data")]
    payload: String,
}

impl AggregatedRecord {
    pub fn new(
        source: impl Into<String>,
        category: impl Into<String>,
        timestamp: DateTime<Utc>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            category: category.into(),
            timestamp,
            payload: payload.into(),
        }
    }

    /// Origin adapter, e.g. "OpenWeatherMap", "NewsAPI", "GitHub".
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Classification, e.g. "Weather", "News", "Repository".
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Publication / creation time, or fetch time when the upstream has none.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}
