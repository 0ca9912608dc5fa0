pub mod orchestrator;
pub mod trainer;

pub use orchestrator::PredictionOrchestrator;
pub use trainer::{TrainingRunner, TrainingSummary};
