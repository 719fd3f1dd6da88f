//! Error types for Leadflow

use thiserror::Error;

/// Main error type for Leadflow
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Leadflow
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Transport(_) => "TRANSPORT_ERROR",
            Error::Api { .. } => "API_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Decode(_) => "DECODE_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
            Error::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a retry at a later tick could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::Validation("bad".into()).code(), "VALIDATION_ERROR");
        assert_eq!(
            Error::Api {
                status: 404,
                message: "missing".into()
            }
            .code(),
            "API_ERROR"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::Transport("connection reset".into()).is_transient());
        assert!(Error::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient());
        assert!(!Error::Api {
            status: 422,
            message: "invalid".into()
        }
        .is_transient());
        assert!(!Error::Validation("bad email".into()).is_transient());
    }
}
