use std::path::PathBuf;

use shared::error::ValidationError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Transport,
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Network error: {0}")]
    Network(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::Validation(_) => ErrorCategory::Validation,
            GatewayError::Network(_) => ErrorCategory::Transport,
            GatewayError::Server { .. } | GatewayError::InvalidResponse(_) => {
                ErrorCategory::Server
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            GatewayError::InvalidResponse(value.to_string())
        } else {
            GatewayError::Network(value.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to read image '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
