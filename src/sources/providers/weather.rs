// src/sources/providers/weather.rs
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::error::FetchError;
use crate::http_client::HttpRequest;
use crate::record::AggregatedRecord;
use crate::sources::types::Upstream;
use crate::sources::{build_get, require_key};

pub const SOURCE: &str = "OpenWeatherMap";
pub const CATEGORY: &str = "Weather";

// OpenWeatherMap current-weather payload; only the fields we render.
#[derive(Debug, Deserialize)]
struct WeatherData {
    name: Option<String>,
    main: Option<WeatherMain>,
    weather: Option<Vec<WeatherDescription>>,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    temp: Option<f64>,
    humidity: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WeatherDescription {
    description: Option<String>,
}

/// Current weather for one city. Always yields exactly one record, stamped
/// with fetch time.
#[derive(Debug, Clone)]
pub struct WeatherSource {
    base_url: String,
    city: String,
    units: String,
    api_key: Option<String>,
    user_agent: String,
}

impl WeatherSource {
    pub fn from_config(cfg: &WeatherConfig, user_agent: &str) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            city: cfg.city.clone(),
            units: cfg.units.clone(),
            api_key: cfg.api_key.as_ref().map(|k| k.expose().to_string()),
            user_agent: user_agent.to_string(),
        }
    }
}

impl Upstream for WeatherSource {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn request(&self) -> Result<HttpRequest, FetchError> {
        let key = require_key(self.api_key.as_deref(), "WEATHER_API_KEY")?;
        build_get(
            &self.base_url,
            &[
                ("q", self.city.as_str()),
                ("appid", key),
                ("units", self.units.as_str()),
            ],
            &self.user_agent,
        )
    }

    fn normalize(
        &self,
        body: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<AggregatedRecord>, FetchError> {
        let data: WeatherData = serde_json::from_str(body)?;

        let (temp, humidity) = data
            .main
            .map(|m| (m.temp.unwrap_or_default(), m.humidity.unwrap_or_default()))
            .unwrap_or_default();
        let description = data
            .weather
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|w| w.description)
            .unwrap_or_default();

        let payload = format!(
            "City: {}, Temperature: {}°C, Humidity: {}%, Description: {}",
            data.name.unwrap_or_default(),
            temp,
            humidity,
            description
        );

        Ok(vec![AggregatedRecord::new(SOURCE, CATEGORY, fetched_at, payload)])
    }
}
