/// Caller-visible error taxonomy for the prediction engine.
///
/// Signal-acquisition and persistence failures are deliberately absent:
/// the former are absorbed inside the signal providers, the latter are
/// logged and never invalidate an already-computed prediction.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PredictResult<T> = Result<T, PredictError>;
