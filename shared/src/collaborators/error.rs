use thiserror::Error;

/// Errors reported by an estimation filter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    /// An input does not have the dimension the filter was configured for
    #[error("Filter expected {what} of dimension {expected}, got {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Filter was handed a number of mode inputs other than its mode count
    #[error("Filter models {expected} modes, but {found} mode inputs were provided")]
    ModeCountMismatch { expected: usize, found: usize },

    /// Filter cannot operate with its model configuration
    #[error("Filter rejected its configuration: {reason}")]
    Rejected { reason: String },
}
