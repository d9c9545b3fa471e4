use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(EventId);

/// Format used by datetime-local inputs and the update form pre-fill.
pub const FORM_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parses the timestamp shapes the backend and the forms produce.
///
/// Offsets (RFC 3339, or the RFC 2822 `GMT` form the backend's JSON encoder
/// emits) are dropped after conversion to UTC, so every timestamp compares as
/// wall-clock time. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.naive_utc());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Renders a server timestamp in datetime-local form, or passes it through
/// untouched when it cannot be parsed.
pub fn to_form_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(parsed) => parsed.format(FORM_DATETIME_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventField {
    EventName,
    StartTime,
    EndTime,
    Location,
    Description,
    Category,
}

impl EventField {
    /// Wire order of the multipart form fields.
    pub const ALL: [EventField; 6] = [
        EventField::EventName,
        EventField::StartTime,
        EventField::EndTime,
        EventField::Location,
        EventField::Description,
        EventField::Category,
    ];

    pub fn form_key(self) -> &'static str {
        match self {
            EventField::EventName => "event_name",
            EventField::StartTime => "start_time",
            EventField::EndTime => "end_time",
            EventField::Location => "location",
            EventField::Description => "description",
            EventField::Category => "category",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventField::EventName => "event name",
            EventField::StartTime => "start time",
            EventField::EndTime => "end time",
            EventField::Location => "location",
            EventField::Description => "description",
            EventField::Category => "category",
        }
    }

    /// Maximum length in characters, if the field is bounded.
    pub fn max_len(self) -> Option<usize> {
        match self {
            EventField::EventName => Some(100),
            EventField::Location => Some(255),
            EventField::Category => Some(50),
            EventField::StartTime | EventField::EndTime | EventField::Description => None,
        }
    }

    pub fn is_timestamp(self) -> bool {
        matches!(self, EventField::StartTime | EventField::EndTime)
    }
}

/// Multipart field name carrying the image file.
pub const IMAGE_FORM_KEY: &str = "file";
/// Form field carrying the existing image reference when no file is sent.
pub const RETAINED_IMAGE_FORM_KEY: &str = "banner_image_url";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMime {
    Png,
    Jpeg,
    Gif,
}

impl ImageMime {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageMime::Png),
            "image/jpeg" | "image/jpg" => Some(ImageMime::Jpeg),
            "image/gif" => Some(ImageMime::Gif),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Gif => "image/gif",
        }
    }
}

/// Editable event fields, keyed the way the backend's form handler expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFields {
    pub event_name: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub description: String,
    pub category: String,
}

impl EventFields {
    pub fn get(&self, field: EventField) -> &str {
        match field {
            EventField::EventName => &self.event_name,
            EventField::StartTime => &self.start_time,
            EventField::EndTime => &self.end_time,
            EventField::Location => &self.location,
            EventField::Description => &self.description,
            EventField::Category => &self.category,
        }
    }

    pub fn get_mut(&mut self, field: EventField) -> &mut String {
        match field {
            EventField::EventName => &mut self.event_name,
            EventField::StartTime => &mut self.start_time,
            EventField::EndTime => &mut self.end_time,
            EventField::Location => &mut self.location,
            EventField::Description => &mut self.description,
            EventField::Category => &mut self.category,
        }
    }

    /// `(form_key, value)` pairs in wire order.
    pub fn form_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        EventField::ALL
            .into_iter()
            .map(move |field| (field.form_key(), self.get(field)))
    }

    pub fn first_empty(&self) -> Option<EventField> {
        EventField::ALL
            .into_iter()
            .find(|field| self.get(*field).is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Event {
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.start_time)
    }

    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.end_time)
    }

    /// Inclusive on both ends; an unparseable bound never matches.
    pub fn is_active_at(&self, instant: NaiveDateTime) -> bool {
        match (self.starts_at(), self.ends_at()) {
            (Some(start), Some(end)) => start <= instant && end >= instant,
            _ => false,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_ref
            .as_deref()
            .is_some_and(|image_ref| !image_ref.trim().is_empty())
    }

    /// Draft values used to pre-fill the update form.
    pub fn to_fields(&self) -> EventFields {
        EventFields {
            event_name: self.name.clone(),
            start_time: to_form_timestamp(&self.start_time),
            end_time: to_form_timestamp(&self.end_time),
            location: self.location.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
        }
    }
}

/// A selectable value in a filter dropdown; an empty value means "All".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterChoice {
    pub value: &'static str,
    pub label: &'static str,
}

pub const LOCATION_CHOICES: &[FilterChoice] = &[
    FilterChoice { value: "", label: "All" },
    FilterChoice { value: "Ahmedabad", label: "Ahmedabad" },
    FilterChoice { value: "Gandhinagar", label: "Gandhinagar" },
    FilterChoice { value: "Vadodara", label: "Vadodara" },
];

pub const CATEGORY_CHOICES: &[FilterChoice] = &[
    FilterChoice { value: "", label: "All" },
    FilterChoice { value: "Music", label: "Music" },
    FilterChoice { value: "Business", label: "Business" },
    FilterChoice { value: "Exhibition", label: "Exhibition" },
];

pub fn choice_label(choices: &[FilterChoice], value: &str) -> &'static str {
    choices
        .iter()
        .find(|choice| choice.value == value)
        .map(|choice| choice.label)
        .unwrap_or("Custom")
}
