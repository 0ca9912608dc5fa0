pub mod app_config;
pub mod database;
pub mod memory;
pub mod order_repo;
pub mod prediction_repo;

pub use database::DbClient;
pub use memory::{InMemoryOrderRepository, InMemoryPredictionRepository, InMemoryTrainingRepository};
pub use order_repo::PgOrderRepository;
pub use prediction_repo::{PgPredictionRepository, PgTrainingRepository};
