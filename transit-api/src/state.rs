use std::sync::Arc;
use transit_predict::{PredictionOrchestrator, TrainingRunner};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PredictionOrchestrator>,
    pub trainer: Arc<TrainingRunner>,
}
