use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// External signal sources. Both API keys are optional: an absent key
/// disables the corresponding live signal and the engine runs on neutral
/// defaults and heuristics instead.
#[derive(Debug, Deserialize, Clone)]
pub struct SignalsConfig {
    #[serde(default)]
    pub weather_api_key: Option<String>,
    #[serde(default)]
    pub traffic_api_key: Option<String>,
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    #[serde(default = "default_traffic_base_url")]
    pub traffic_base_url: String,
    /// Per-call budget for a live fetch; a timeout degrades to the neutral
    /// default exactly like any other fetch failure.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    #[serde(default = "default_training_chunk_size")]
    pub training_chunk_size: usize,
}

fn default_weather_base_url() -> String {
    "https://api.weather.example.com".to_string()
}

fn default_traffic_base_url() -> String {
    "https://api.traffic.example.com".to_string()
}

fn default_fetch_timeout_ms() -> u64 {
    3000
}

fn default_max_batch_size() -> usize {
    50
}

fn default_training_chunk_size() -> usize {
    200
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            weather_api_key: None,
            traffic_api_key: None,
            weather_base_url: default_weather_base_url(),
            traffic_base_url: default_traffic_base_url(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            training_chunk_size: default_training_chunk_size(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables, e.g. TRANSIT__SIGNALS__WEATHER_API_KEY
            .add_source(config::Environment::with_prefix("TRANSIT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
