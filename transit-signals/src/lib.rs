pub mod provider;
pub mod traffic;
pub mod weather;

pub use provider::RealTimeFeatureProvider;
pub use traffic::{HttpTrafficProvider, TrafficProvider};
pub use weather::{HttpWeatherProvider, WeatherObservation, WeatherProvider};

/// Why a live signal could not be acquired. Never escapes this crate:
/// the feature provider absorbs every variant into a neutral default.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("signal unavailable: {0}")]
    Unavailable(String),
}
