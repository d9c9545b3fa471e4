use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::EventField;

/// Body the backend returns alongside a non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiError {
    /// Extracts the message from a raw response body, if it carries one.
    pub fn message_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<ApiError>(body)
            .ok()
            .and_then(|api_error| api_error.error)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}

/// Client-detected problems; these never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Maximum length for {} is {max} characters", .field.label())]
    TooLong { field: EventField, max: usize },
    #[error("Please fill in the {} field", .field.label())]
    MissingField { field: EventField },
    #[error("Invalid {}; expected YYYY-MM-DDTHH:MM", .field.label())]
    InvalidTimestamp { field: EventField },
    #[error("End time must not be before start time")]
    EndBeforeStart,
    #[error("Only PNG, JPEG, and GIF files are allowed")]
    UnsupportedImageType { mime: String },
    #[error("Please upload an image")]
    MissingImage,
}
