//! Errors raised by the aggregation recipes.

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// The filtered window is too small for the requested recipe.
    #[error("Insufficient data: needs at least {required} distinct tracks, found {available}")]
    InsufficientData { required: usize, available: usize },

    /// A control value outside its allowed domain.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AnalysisError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
