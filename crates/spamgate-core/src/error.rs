use thiserror::Error;

/// Failure inside a vectorizer or decision model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("feature index {index} out of range for dimension {dim}")]
    IndexOutOfRange { index: usize, dim: usize },

    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("vectorizer failed: {0}")]
    Vectorize(#[source] ModelError),

    #[error("decision function failed: {0}")]
    Model(#[source] ModelError),

    #[error("decision function returned a non-finite score: {0}")]
    NonFiniteScore(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),
}
