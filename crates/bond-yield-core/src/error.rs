use thiserror::Error;

#[derive(Debug, Error)]
pub enum BondYieldError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Convergence failure: {function} failed to converge within {max_iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        max_iterations: u32,
        last_delta: f64,
    },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for BondYieldError {
    fn from(e: serde_json::Error) -> Self {
        BondYieldError::SerializationError(e.to_string())
    }
}
