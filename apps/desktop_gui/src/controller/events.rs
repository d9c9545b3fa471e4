//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{ErrorCategory, GatewayError};
use shared::domain::{Event, EventId};

use crate::backend_bridge::commands::{FetchTicket, SubmitTicket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Info(String),
    EventsLoaded {
        ticket: FetchTicket,
        events: Vec<Event>,
    },
    EventsLoadFailed {
        ticket: FetchTicket,
        error: UiError,
    },
    EventCreated {
        submission: SubmitTicket,
    },
    EventUpdated {
        submission: SubmitTicket,
        id: EventId,
    },
    SubmitFailed {
        submission: SubmitTicket,
        error: UiError,
    },
    EventDeleted {
        id: EventId,
    },
    ImageLoaded {
        url: String,
        bytes: Vec<u8>,
    },
    ImageLoadFailed {
        url: String,
        error: UiError,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Server,
    Unknown,
}

impl From<ErrorCategory> for UiErrorCategory {
    fn from(value: ErrorCategory) -> Self {
        match value {
            ErrorCategory::Validation => UiErrorCategory::Validation,
            ErrorCategory::Transport => UiErrorCategory::Transport,
            ErrorCategory::Server => UiErrorCategory::Server,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    FetchEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    FetchImage,
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Server => "Server",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_gateway(context: UiErrorContext, error: &GatewayError) -> Self {
        Self {
            category: error.category().into(),
            context,
            message: error.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message prefixed with the category label, for banners.
    pub fn display(&self) -> String {
        format!("{} error: {}", err_label(self.category), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ValidationError;

    #[test]
    fn gateway_errors_keep_their_category_and_message() {
        let err = UiError::from_gateway(
            UiErrorContext::CreateEvent,
            &GatewayError::Server {
                status: 400,
                message: "Missing required fields".to_string(),
            },
        );
        assert_eq!(err.category(), UiErrorCategory::Server);
        assert_eq!(err.context(), UiErrorContext::CreateEvent);
        assert_eq!(err.display(), "Server error: Missing required fields");

        let err = UiError::from_gateway(
            UiErrorContext::UpdateEvent,
            &GatewayError::Validation(ValidationError::MissingImage),
        );
        assert_eq!(err.category(), UiErrorCategory::Validation);
        assert_eq!(err.message(), "Please upload an image");
    }

    #[test]
    fn classifies_command_queue_disconnect_as_transport_error() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "Backend command processor disconnected",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
    }
}
