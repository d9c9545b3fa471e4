//! Create/update form drafts: per-keystroke validation, image staging, submission payloads.

use std::path::Path;

use client_core::ImageUpload;
use shared::{
    domain::{Event, EventField, EventFields},
    error::ValidationError,
    validation::{validate_field, validate_fields},
};

use crate::backend_bridge::commands::SubmitTicket;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update { existing_image: Option<String> },
}

/// Payload handed to the controller once the draft passes validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub fields: EventFields,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone)]
pub struct EventForm {
    mode: FormMode,
    draft: EventFields,
    initial: EventFields,
    staged_image: Option<ImageUpload>,
    // Bumped whenever the staged image changes so the view can release stale previews.
    preview_revision: u64,
    error: Option<String>,
    pending: Option<SubmitTicket>,
}

impl EventForm {
    pub fn create() -> Self {
        Self::with_mode(FormMode::Create, EventFields::default())
    }

    pub fn update(target: &Event) -> Self {
        Self::with_mode(
            FormMode::Update {
                existing_image: target.image_ref.clone().filter(|_| target.has_image()),
            },
            target.to_fields(),
        )
    }

    fn with_mode(mode: FormMode, draft: EventFields) -> Self {
        Self {
            mode,
            initial: draft.clone(),
            draft,
            staged_image: None,
            preview_revision: 0,
            error: None,
            pending: None,
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self.mode, FormMode::Update { .. })
    }

    pub fn draft(&self) -> &EventFields {
        &self.draft
    }

    pub fn value(&self, field: EventField) -> &str {
        self.draft.get(field)
    }

    /// Applies one edit; over-long input is rejected and reported, the draft keeps its old value.
    pub fn set_field(&mut self, field: EventField, value: String) -> Result<(), ValidationError> {
        if let Err(err) = validate_field(field, &value) {
            self.error = Some(err.to_string());
            return Err(err);
        }
        *self.draft.get_mut(field) = value;
        self.error = None;
        Ok(())
    }

    pub fn stage_image(&mut self, upload: ImageUpload) {
        tracing::debug!(
            filename = %upload.filename,
            size_bytes = upload.size_bytes(),
            "form: staged image"
        );
        self.staged_image = Some(upload);
        self.preview_revision += 1;
        self.error = None;
    }

    /// Loads and stages an image from disk; unsupported types are reported and nothing changes.
    pub fn stage_image_file(&mut self, path: &Path) {
        match ImageUpload::from_path(path) {
            Ok(upload) => self.stage_image(upload),
            Err(err) => {
                tracing::warn!(path = %path.display(), "form: image rejected: {err}");
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn staged_image(&self) -> Option<&ImageUpload> {
        self.staged_image.as_ref()
    }

    pub fn preview_revision(&self) -> u64 {
        self.preview_revision
    }

    pub fn existing_image(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Update { existing_image } => existing_image.as_deref(),
            FormMode::Create => None,
        }
    }

    /// A staged file, or for updates the image already stored on the server.
    pub fn has_image(&self) -> bool {
        self.staged_image.is_some() || self.existing_image().is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.pending.is_none() && self.draft.first_empty().is_none() && self.has_image()
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether `submission` is the request this form is waiting on.
    pub fn awaits(&self, submission: SubmitTicket) -> bool {
        self.pending == Some(submission)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Re-validates everything and produces the payload to send under `submission`.
    pub fn submit(&mut self, submission: SubmitTicket) -> Result<FormSubmission, ValidationError> {
        let checked = validate_fields(&self.draft).and_then(|()| {
            if self.has_image() {
                Ok(())
            } else {
                Err(ValidationError::MissingImage)
            }
        });
        if let Err(err) = checked {
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.pending = Some(submission);
        self.error = None;
        Ok(FormSubmission {
            fields: self.draft.clone(),
            image: self.staged_image.clone(),
        })
    }

    /// The request failed; the draft stays populated for another attempt.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.pending = None;
        self.error = Some(message.into());
    }

    /// Back to the state the form opened with, releasing any staged image.
    pub fn reset(&mut self) {
        self.draft = self.initial.clone();
        if self.staged_image.take().is_some() {
            self.preview_revision += 1;
        }
        self.error = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::EventId;

    fn png() -> ImageUpload {
        ImageUpload::new("banner.png", "image/png", vec![1, 2, 3]).expect("image")
    }

    fn fill(form: &mut EventForm) {
        for (field, value) in [
            (EventField::EventName, "Jazz Night"),
            (EventField::StartTime, "2024-01-01T10:00"),
            (EventField::EndTime, "2024-01-01T12:00"),
            (EventField::Location, "Ahmedabad"),
            (EventField::Description, "Live music"),
            (EventField::Category, "Music"),
        ] {
            form.set_field(field, value.to_string()).expect("valid value");
        }
    }

    fn target(image_ref: Option<&str>) -> Event {
        Event {
            id: EventId(9),
            name: "Expo".into(),
            start_time: "Thu, 01 Feb 2024 09:00:00 GMT".into(),
            end_time: "Sat, 03 Feb 2024 18:00:00 GMT".into(),
            location: "Vadodara".into(),
            description: "Trade expo".into(),
            category: "Exhibition".into(),
            image_ref: image_ref.map(str::to_string),
        }
    }

    #[test]
    fn rejects_overlong_keystroke_without_truncating() {
        let mut form = EventForm::create();
        form.set_field(EventField::Category, "Music".into())
            .expect("short value");

        let err = form
            .set_field(EventField::Category, "x".repeat(51))
            .expect_err("too long");

        assert_eq!(
            err,
            ValidationError::TooLong {
                field: EventField::Category,
                max: 50
            }
        );
        assert_eq!(form.value(EventField::Category), "Music");
        assert_eq!(
            form.error(),
            Some("Maximum length for category is 50 characters")
        );

        form.set_field(EventField::Category, "Business".into())
            .expect("valid again");
        assert_eq!(form.error(), None);
    }

    #[test]
    fn create_submit_requires_fields_and_image() {
        let mut form = EventForm::create();
        assert!(!form.can_submit());

        fill(&mut form);
        assert!(!form.can_submit());
        assert_eq!(form.submit(SubmitTicket(1)), Err(ValidationError::MissingImage));
        assert_eq!(form.error(), Some("Please upload an image"));

        form.stage_image(png());
        assert!(form.can_submit());
        let submission = form.submit(SubmitTicket(2)).expect("valid submission");
        assert_eq!(submission.fields.event_name, "Jazz Night");
        assert_eq!(submission.image, Some(png()));
        assert!(form.is_submitting());
        assert!(form.awaits(SubmitTicket(2)));
        assert!(!form.awaits(SubmitTicket(1)));
        assert!(!form.can_submit());
    }

    #[test]
    fn update_lets_existing_image_stand_in() {
        let mut form = EventForm::update(&target(Some("/uploads/expo.png")));

        assert_eq!(form.value(EventField::StartTime), "2024-02-01T09:00");
        assert_eq!(form.existing_image(), Some("/uploads/expo.png"));
        assert!(form.can_submit());

        let submission = form.submit(SubmitTicket(2)).expect("valid submission");
        assert_eq!(submission.image, None);
    }

    #[test]
    fn update_without_any_image_is_blocked() {
        let mut form = EventForm::update(&target(Some("")));
        assert_eq!(form.existing_image(), None);
        assert!(!form.can_submit());
        assert_eq!(form.submit(SubmitTicket(1)), Err(ValidationError::MissingImage));
    }

    #[test]
    fn failure_keeps_draft_and_allows_retry() {
        let mut form = EventForm::create();
        fill(&mut form);
        form.stage_image(png());
        form.submit(SubmitTicket(3)).expect("submission");

        form.fail("Missing required fields");

        assert_eq!(form.error(), Some("Missing required fields"));
        assert!(!form.awaits(SubmitTicket(3)));
        assert_eq!(form.value(EventField::EventName), "Jazz Night");
        assert!(form.staged_image().is_some());
        assert!(form.can_submit());
    }

    #[test]
    fn staging_and_reset_advance_preview_revision() {
        let mut form = EventForm::create();
        assert_eq!(form.preview_revision(), 0);

        form.stage_image(png());
        form.stage_image(png());
        assert_eq!(form.preview_revision(), 2);

        fill(&mut form);
        form.reset();
        assert_eq!(form.preview_revision(), 3);
        assert!(form.staged_image().is_none());
        assert_eq!(form.draft(), &EventFields::default());

        form.reset();
        assert_eq!(form.preview_revision(), 3);
    }

    #[test]
    fn rejected_image_file_leaves_previous_stage_intact() {
        let dir = std::env::temp_dir().join(format!("events_form_image_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let svg = dir.join("logo.svg");
        std::fs::write(&svg, b"<svg/>").expect("write svg");

        let mut form = EventForm::create();
        form.stage_image(png());
        form.stage_image_file(&svg);

        assert_eq!(form.error(), Some("Only PNG, JPEG, and GIF files are allowed"));
        assert_eq!(form.staged_image(), Some(&png()));
        assert_eq!(form.preview_revision(), 1);

        std::fs::remove_dir_all(dir).expect("cleanup");
    }
}
