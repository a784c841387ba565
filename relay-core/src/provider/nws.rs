use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::RelayConfig,
    error::RelayError,
    model::{Location, Temperature, WeatherReading},
};

use super::WeatherProvider;

/// weather.gov `MapClick.php` client, JSON flavour.
#[derive(Debug, Clone)]
pub struct NwsProvider {
    base_url: Url,
    http: Client,
}

impl NwsProvider {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| RelayError::Config(format!("base_url '{}': {e}", config.base_url)))?;

        // No timeout of our own: the client default applies.
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    /// `<base>?lat=<lat>&lon=<lon>&FcstType=json`
    pub fn request_url(&self, location: Location) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("lat", &location.latitude().to_string())
            .append_pair("lon", &location.longitude().to_string())
            .append_pair("FcstType", "json");
        url
    }
}

#[derive(Debug, Deserialize)]
struct MapClickResponse {
    currentobservation: CurrentObservation,
}

#[derive(Debug, Deserialize)]
struct CurrentObservation {
    #[serde(rename = "Temp")]
    temp: Temperature,
    #[serde(rename = "Weather")]
    weather: String,
}

/// Parse a `MapClick.php` body into a reading.
pub fn parse_reading(body: &str) -> Result<WeatherReading, RelayError> {
    let parsed: MapClickResponse = serde_json::from_str(body)?;

    Ok(WeatherReading {
        temperature: parsed.currentobservation.temp,
        conditions: parsed.currentobservation.weather,
    })
}

#[async_trait]
impl WeatherProvider for NwsProvider {
    async fn current_reading(&self, location: Location) -> Result<WeatherReading, RelayError> {
        let url = self.request_url(location);
        debug!(%url, "requesting current observation");

        let res = self.http.get(url).send().await.map_err(RelayError::Network)?;

        let status = res.status();
        let body = res.text().await.map_err(RelayError::Network)?;

        if !status.is_success() {
            return Err(RelayError::Status { status, body: truncate_body(&body) });
        }

        parse_reading(&body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
