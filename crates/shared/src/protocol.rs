use serde::{Deserialize, Serialize};

use crate::domain::{Event, EventId};

/// One event as the backend lists it: a positional tuple of
/// `[id, name, start_time, end_time, location, description, category, image_path]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRow(
    pub EventId,
    pub String,
    pub String,
    pub String,
    pub String,
    pub Option<String>,
    pub String,
    pub Option<String>,
);

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        let EventRow(id, name, start_time, end_time, location, description, category, image_ref) =
            row;
        Self {
            id,
            name,
            start_time,
            end_time,
            location,
            description: description.unwrap_or_default(),
            category,
            image_ref: image_ref.filter(|image_ref| !image_ref.trim().is_empty()),
        }
    }
}

/// `GET /api/data` response: an array whose first element is the event list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventListEnvelope(pub Vec<Vec<EventRow>>);

impl EventListEnvelope {
    pub fn into_events(self) -> Vec<Event> {
        self.0
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(Event::from)
            .collect()
    }
}
