use crate::{
    domain::{parse_timestamp, EventField, EventFields, ImageMime},
    error::ValidationError,
};

/// Length check applied on every keystroke; longer input is rejected, never truncated.
pub fn validate_field(field: EventField, value: &str) -> Result<(), ValidationError> {
    match field.max_len() {
        Some(max) if value.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        _ => Ok(()),
    }
}

/// Full pre-submit check: lengths, required fields, timestamp shape and ordering.
pub fn validate_fields(fields: &EventFields) -> Result<(), ValidationError> {
    for field in EventField::ALL {
        validate_field(field, fields.get(field))?;
    }

    if let Some(field) = fields.first_empty() {
        return Err(ValidationError::MissingField { field });
    }

    let start = parse_timestamp(&fields.start_time).ok_or(ValidationError::InvalidTimestamp {
        field: EventField::StartTime,
    })?;
    let end = parse_timestamp(&fields.end_time).ok_or(ValidationError::InvalidTimestamp {
        field: EventField::EndTime,
    })?;
    if end < start {
        return Err(ValidationError::EndBeforeStart);
    }

    Ok(())
}

pub fn validate_image_mime(mime: &str) -> Result<ImageMime, ValidationError> {
    ImageMime::from_mime(mime).ok_or_else(|| ValidationError::UnsupportedImageType {
        mime: mime.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_fields() -> EventFields {
        EventFields {
            event_name: "Jazz Night".into(),
            start_time: "2024-01-01T10:00".into(),
            end_time: "2024-01-01T12:00".into(),
            location: "Ahmedabad".into(),
            description: "Live music".into(),
            category: "Music".into(),
        }
    }

    #[test]
    fn accepts_complete_fields() {
        assert_eq!(validate_fields(&valid_fields()), Ok(()));
    }

    #[test]
    fn rejects_name_over_one_hundred_characters() {
        assert_eq!(validate_field(EventField::EventName, &"a".repeat(100)), Ok(()));
        assert_eq!(
            validate_field(EventField::EventName, &"a".repeat(101)),
            Err(ValidationError::TooLong {
                field: EventField::EventName,
                max: 100
            })
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(validate_field(EventField::Category, &"é".repeat(50)), Ok(()));
    }

    #[test]
    fn description_is_unbounded() {
        assert_eq!(
            validate_field(EventField::Description, &"x".repeat(10_000)),
            Ok(())
        );
    }

    #[test]
    fn reports_first_missing_field() {
        let mut fields = valid_fields();
        fields.location.clear();
        fields.category.clear();
        assert_eq!(
            validate_fields(&fields),
            Err(ValidationError::MissingField {
                field: EventField::Location
            })
        );
    }

    #[test]
    fn rejects_unparseable_and_inverted_windows() {
        let mut fields = valid_fields();
        fields.start_time = "tomorrow".into();
        assert_eq!(
            validate_fields(&fields),
            Err(ValidationError::InvalidTimestamp {
                field: EventField::StartTime
            })
        );

        let mut fields = valid_fields();
        fields.end_time = "2024-01-01T09:00".into();
        assert_eq!(validate_fields(&fields), Err(ValidationError::EndBeforeStart));

        let mut fields = valid_fields();
        fields.end_time = fields.start_time.clone();
        assert_eq!(validate_fields(&fields), Ok(()));
    }

    #[test]
    fn image_mime_must_be_png_jpeg_or_gif() {
        assert_eq!(validate_image_mime("image/gif"), Ok(ImageMime::Gif));
        assert!(matches!(
            validate_image_mime("image/svg+xml"),
            Err(ValidationError::UnsupportedImageType { .. })
        ));
    }
}
