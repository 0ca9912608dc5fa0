use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::SignalError;

/// Raw weather reading for a city.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherObservation {
    pub condition: String,
    pub temperature_c: f64,
    pub wind_speed: f64,
}

/// Adapter trait for the weather signal source.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherObservation, SignalError>;
}

/// Duration multiplier for a reported condition. Unrecognized conditions
/// are treated as neutral.
pub fn condition_factor(condition: &str) -> f64 {
    match condition.to_lowercase().as_str() {
        "clear" => 0.95,
        "cloudy" => 1.0,
        "rain" => 1.25,
        "snow" => 1.5,
        "fog" => 1.3,
        "storm" => 1.6,
        _ => 1.0,
    }
}

/// Full weather factor: condition multiplier, boosted for extreme
/// temperature (below -10 C or above 40 C) and high wind (above 15).
pub fn weather_factor(observation: &WeatherObservation) -> f64 {
    let mut factor = condition_factor(&observation.condition);
    if observation.temperature_c < -10.0 || observation.temperature_c > 40.0 {
        factor *= 1.1;
    }
    if observation.wind_speed > 15.0 {
        factor *= 1.05;
    }
    factor
}

/// Live HTTP weather client. One attempt per call, bounded by the
/// configured timeout; a timeout is indistinguishable from any other
/// failure to the caller.
pub struct HttpWeatherProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpWeatherProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, SignalError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for HttpWeatherProvider {
    async fn current(&self, city: &str) -> Result<WeatherObservation, SignalError> {
        let url = format!("{}/v1/current", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("city", city), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<WeatherObservation>().await?)
    }
}
