use chrono::{DateTime, Utc};
use std::sync::Arc;
use transit_core::address::extract_city;
use transit_model::RealTimeFactors;

use crate::traffic::{congestion_level, heuristic_level, TrafficProvider};
use crate::weather::{weather_factor, WeatherProvider};

/// Fetches both live signals for a shipment and never fails.
///
/// Each signal degrades independently: missing credentials or any fetch
/// failure substitutes the documented neutral default for that signal
/// alone, and the two fetches run concurrently so one cannot block or
/// alter the other.
pub struct RealTimeFeatureProvider {
    weather: Option<Arc<dyn WeatherProvider>>,
    traffic: Option<Arc<dyn TrafficProvider>>,
}

impl RealTimeFeatureProvider {
    pub fn new(
        weather: Option<Arc<dyn WeatherProvider>>,
        traffic: Option<Arc<dyn TrafficProvider>>,
    ) -> Self {
        Self { weather, traffic }
    }

    /// Provider with no credentials: weather unknown, traffic on the
    /// time-of-day heuristic.
    pub fn uncredentialed() -> Self {
        Self::new(None, None)
    }

    pub async fn fetch(&self, destination: &str, at: DateTime<Utc>) -> RealTimeFactors {
        let city = extract_city(destination);
        let (weather, traffic) = tokio::join!(self.weather_signal(&city), self.traffic_signal(&city, at));

        RealTimeFactors {
            weather_factor: weather.0,
            weather_condition: weather.1,
            temperature_c: weather.2,
            wind_speed: weather.3,
            traffic_factor: traffic.1,
            traffic_level: traffic.0.to_string(),
        }
    }

    async fn weather_signal(&self, city: &str) -> (f64, String, Option<f64>, Option<f64>) {
        let unknown = (1.0, "unknown".to_string(), None, None);

        let Some(provider) = &self.weather else {
            return unknown;
        };

        match provider.current(city).await {
            Ok(observation) => (
                weather_factor(&observation),
                observation.condition.to_lowercase(),
                Some(observation.temperature_c),
                Some(observation.wind_speed),
            ),
            Err(err) => {
                tracing::debug!(city, error = %err, "weather fetch failed, using neutral factor");
                unknown
            }
        }
    }

    /// The traffic floor is the time-of-day heuristic, not a flat 1.0:
    /// with no provider (or a failed fetch) an uncredentialed run still
    /// carries a 1.2 peak or 0.9 light factor outside normal hours, so
    /// the combined real-time factor is only exactly neutral off-peak.
    async fn traffic_signal(&self, city: &str, at: DateTime<Utc>) -> (&'static str, f64) {
        if let Some(provider) = &self.traffic {
            match provider.congestion(city).await {
                Ok(ratio) => return congestion_level(ratio),
                Err(err) => {
                    tracing::debug!(city, error = %err, "traffic fetch failed, using heuristic");
                }
            }
        }
        heuristic_level(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::WeatherObservation;
    use crate::SignalError;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FailingWeather;

    #[async_trait]
    impl WeatherProvider for FailingWeather {
        async fn current(&self, _city: &str) -> Result<WeatherObservation, SignalError> {
            Err(SignalError::Unavailable("connection reset".to_string()))
        }
    }

    struct StubWeather(WeatherObservation);

    #[async_trait]
    impl WeatherProvider for StubWeather {
        async fn current(&self, _city: &str) -> Result<WeatherObservation, SignalError> {
            Ok(self.0.clone())
        }
    }

    struct FailingTraffic;

    #[async_trait]
    impl TrafficProvider for FailingTraffic {
        async fn congestion(&self, _city: &str) -> Result<f64, SignalError> {
            Err(SignalError::Unavailable("timeout".to_string()))
        }
    }

    struct StubTraffic(f64);

    #[async_trait]
    impl TrafficProvider for StubTraffic {
        async fn congestion(&self, _city: &str) -> Result<f64, SignalError> {
            Ok(self.0)
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn no_credentials_is_exactly_neutral_off_peak() {
        let provider = RealTimeFeatureProvider::uncredentialed();
        let factors = provider.fetch("Hamburg, Germany", noon()).await;

        assert_eq!(factors.weather_condition, "unknown");
        assert_eq!(factors.weather_factor, 1.0);
        assert_eq!(factors.traffic_level, "normal");
        assert_eq!(factors.combined(), 1.0);
    }

    #[tokio::test]
    async fn no_credentials_still_applies_time_of_day() {
        let provider = RealTimeFeatureProvider::uncredentialed();
        let rush = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap();
        let factors = provider.fetch("Hamburg, Germany", rush).await;

        assert_eq!(factors.weather_factor, 1.0);
        assert_eq!(factors.traffic_level, "peak");
        assert_eq!(factors.traffic_factor, 1.2);
    }

    #[tokio::test]
    async fn weather_failure_does_not_touch_traffic() {
        let provider = RealTimeFeatureProvider::new(
            Some(Arc::new(FailingWeather)),
            Some(Arc::new(StubTraffic(0.9))),
        );
        let factors = provider.fetch("Berlin, Germany", noon()).await;

        assert_eq!(factors.weather_condition, "unknown");
        assert_eq!(factors.weather_factor, 1.0);
        assert_eq!(factors.traffic_level, "peak");
        assert_eq!(factors.traffic_factor, 1.2);
    }

    #[tokio::test]
    async fn traffic_failure_falls_back_to_heuristic() {
        let observation = WeatherObservation {
            condition: "Rain".to_string(),
            temperature_c: 9.0,
            wind_speed: 4.0,
        };
        let provider = RealTimeFeatureProvider::new(
            Some(Arc::new(StubWeather(observation))),
            Some(Arc::new(FailingTraffic)),
        );
        let factors = provider.fetch("Berlin, Germany", noon()).await;

        assert_eq!(factors.weather_condition, "rain");
        assert_eq!(factors.weather_factor, 1.25);
        assert_eq!(factors.traffic_level, "normal");
        assert_eq!(factors.traffic_factor, 1.0);
    }

    #[tokio::test]
    async fn live_observations_are_carried_into_the_breakdown() {
        let observation = WeatherObservation {
            condition: "snow".to_string(),
            temperature_c: -14.0,
            wind_speed: 18.0,
        };
        let provider = RealTimeFeatureProvider::new(Some(Arc::new(StubWeather(observation))), None);
        let factors = provider.fetch("Warehouse 3, Oslo, Norway", noon()).await;

        assert_eq!(factors.temperature_c, Some(-14.0));
        assert_eq!(factors.wind_speed, Some(18.0));
        assert!((factors.weather_factor - 1.5 * 1.1 * 1.05).abs() < 1e-12);
    }
}
