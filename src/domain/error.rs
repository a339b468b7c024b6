use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Segment model not fitted: {0}")]
    NotFitted(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("No demand models loaded")]
    NoModelsLoaded,

    #[error("Invalid rule expression: {0}")]
    InvalidExpression(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("External provider error: {0}")]
    External(String),
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}
