//! Error types for the matching engine.

/// Error type for pattern compilation and input validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid pattern '{source_text}': {message}")]
    InvalidPattern { source_text: String, message: String },
    #[error("Invalid negative reason: {0}")]
    InvalidReason(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("System '{system}': {error}")]
    InSystem {
        system: String,
        #[source]
        error: Box<CoreError>,
    },
}

impl CoreError {
    pub(crate) fn invalid_pattern(source_text: &str, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            source_text: source_text.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn in_system(self, system: &str) -> Self {
        Self::InSystem {
            system: system.to_string(),
            error: Box::new(self),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
