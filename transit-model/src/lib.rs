pub mod fusion;
pub mod noise;
pub mod static_model;
pub mod tables;

pub use fusion::{FusionPredictor, PredictionOutcome, RealTimeFactors};
pub use noise::{FixedNoise, NoiseSource, ThreadRngNoise};
pub use static_model::{DistanceCategory, Season, StaticFactorModel, StaticFactors};
pub use tables::FactorTables;
