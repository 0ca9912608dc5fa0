pub mod address;
pub mod error;
pub mod order;
pub mod prediction;
pub mod repository;

pub use error::{PredictError, PredictResult};
pub use order::Order;
pub use prediction::{FactorBreakdown, ModelVersion, Prediction, TrainingRecord};
