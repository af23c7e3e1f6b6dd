use thiserror::Error;

/// Main error type for the hello pipeline
#[derive(Error, Debug)]
pub enum HpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of a single batch task. Any of these aborts aggregation for the run.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Batch {index} panicked: {message}")]
    Panicked { index: usize, message: String },

    #[error("Batch {index} was cancelled")]
    Cancelled { index: usize },

    #[error("Failed to write outputs for batch {index}: {message}")]
    OutputFailed { index: usize, message: String },
}

impl BatchError {
    /// Index of the batch that failed.
    pub fn index(&self) -> usize {
        match self {
            Self::Panicked { index, .. }
            | Self::Cancelled { index }
            | Self::OutputFailed { index, .. } => *index,
        }
    }
}

/// Result type alias for hello pipeline operations
pub type HpResult<T> = Result<T, HpError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::HpError::Validation(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::HpError::Config(format!($($arg)*))
    };
}
