use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transit_api::{app, AppState};
use transit_model::{FactorTables, FusionPredictor, ThreadRngNoise};
use transit_predict::{PredictionOrchestrator, TrainingRunner};
use transit_signals::{
    HttpTrafficProvider, HttpWeatherProvider, RealTimeFeatureProvider, TrafficProvider,
    WeatherProvider,
};
use transit_store::app_config::SignalsConfig;
use transit_store::{DbClient, PgOrderRepository, PgPredictionRepository, PgTrainingRepository};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transit_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = transit_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Transit ETA API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");

    let orders = Arc::new(PgOrderRepository::new(db.pool.clone()));
    let predictions = Arc::new(PgPredictionRepository::new(db.pool.clone()));
    let training = Arc::new(PgTrainingRepository::new(db.pool.clone()));

    let signals = Arc::new(build_signals(&config.signals));
    let predictor = Arc::new(FusionPredictor::new(
        FactorTables::default(),
        Arc::new(ThreadRngNoise),
    ));

    let app_state = AppState {
        orchestrator: Arc::new(PredictionOrchestrator::new(
            orders.clone(),
            predictions,
            predictor.clone(),
            signals.clone(),
            config.engine.max_batch_size,
        )),
        trainer: Arc::new(TrainingRunner::new(
            orders,
            training,
            predictor,
            signals,
            config.engine.training_chunk_size,
        )),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Wires the live signal clients from config. A missing API key disables
/// that signal only; the provider then serves its neutral default.
fn build_signals(config: &SignalsConfig) -> RealTimeFeatureProvider {
    let timeout = Duration::from_millis(config.fetch_timeout_ms);

    let weather: Option<Arc<dyn WeatherProvider>> = match &config.weather_api_key {
        Some(key) => match HttpWeatherProvider::new(&config.weather_base_url, key, timeout) {
            Ok(provider) => Some(Arc::new(provider)),
            Err(err) => {
                tracing::warn!(error = %err, "weather client setup failed, signal disabled");
                None
            }
        },
        None => {
            tracing::info!("no weather API key configured, live weather signal disabled");
            None
        }
    };

    let traffic: Option<Arc<dyn TrafficProvider>> = match &config.traffic_api_key {
        Some(key) => match HttpTrafficProvider::new(&config.traffic_base_url, key, timeout) {
            Ok(provider) => Some(Arc::new(provider)),
            Err(err) => {
                tracing::warn!(error = %err, "traffic client setup failed, signal disabled");
                None
            }
        },
        None => {
            tracing::info!("no traffic API key configured, using time-of-day heuristic");
            None
        }
    };

    RealTimeFeatureProvider::new(weather, traffic)
}
