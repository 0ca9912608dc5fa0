use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::SignalError;

/// Adapter trait for the live congestion signal. Returns a congestion
/// ratio in `[0, 1]`.
#[async_trait]
pub trait TrafficProvider: Send + Sync {
    async fn congestion(&self, city: &str) -> Result<f64, SignalError>;
}

/// Time-of-day heuristic: morning and evening peaks slow transit, late
/// night speeds it up. This is the floor behavior with or without a live
/// provider.
pub fn heuristic_level(at: DateTime<Utc>) -> (&'static str, f64) {
    let hour = at.hour();
    if (7..=9).contains(&hour) || (17..=19).contains(&hour) {
        ("peak", 1.2)
    } else if hour >= 22 || hour <= 6 {
        ("light", 0.9)
    } else {
        ("normal", 1.0)
    }
}

/// Maps a live congestion ratio onto the same three levels the heuristic
/// produces, so downstream consumers see one vocabulary.
pub fn congestion_level(ratio: f64) -> (&'static str, f64) {
    if ratio > 0.7 {
        ("peak", 1.2)
    } else if ratio < 0.3 {
        ("light", 0.9)
    } else {
        ("normal", 1.0)
    }
}

#[derive(Debug, Deserialize)]
struct CongestionResponse {
    congestion: f64,
}

/// Live HTTP congestion client. One attempt, bounded timeout.
pub struct HttpTrafficProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTrafficProvider {
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
impl TrafficProvider for HttpTrafficProvider {
    async fn congestion(&self, city: &str) -> Result<f64, SignalError> {
        let url = format!("{}/v1/congestion", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("city", city), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body = response.json::<CongestionResponse>().await?;
        Ok(body.congestion)
    }
}
