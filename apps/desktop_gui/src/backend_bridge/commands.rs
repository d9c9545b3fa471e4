//! Backend commands queued from UI to backend worker.

use client_core::ImageUpload;
use shared::domain::{Event, EventFields, EventId};

/// Orders list fetches so that an older response never replaces a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(pub u64);

/// Ties a create/update result to the form submission that sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmitTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    FetchEvents {
        ticket: FetchTicket,
    },
    CreateEvent {
        submission: SubmitTicket,
        fields: EventFields,
        image: Option<ImageUpload>,
    },
    UpdateEvent {
        submission: SubmitTicket,
        target: Event,
        fields: EventFields,
        image: Option<ImageUpload>,
    },
    DeleteEvent {
        id: EventId,
    },
    FetchImage {
        url: String,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::FetchEvents { .. } => "fetch_events",
            BackendCommand::CreateEvent { .. } => "create_event",
            BackendCommand::UpdateEvent { .. } => "update_event",
            BackendCommand::DeleteEvent { .. } => "delete_event",
            BackendCommand::FetchImage { .. } => "fetch_image",
        }
    }
}
