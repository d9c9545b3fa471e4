use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::{Event, EventFields, EventId, IMAGE_FORM_KEY, RETAINED_IMAGE_FORM_KEY},
    error::{ApiError, ValidationError},
    protocol::EventListEnvelope,
    validation::validate_fields,
};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod types;

pub use config::{load_settings, ClientSettings};
pub use error::{ErrorCategory, GatewayError, ImageLoadError};
pub use types::ImageUpload;

/// Remote operations on the event backend.
///
/// Every operation reports failure through its `Result`; nothing is retried.
#[async_trait]
pub trait EventGateway: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, GatewayError>;
    /// `image` is required; `None` fails before any request is made.
    async fn create_event(
        &self,
        fields: EventFields,
        image: Option<ImageUpload>,
    ) -> Result<(), GatewayError>;
    /// Without a new image the target's stored image is kept.
    async fn update_event(
        &self,
        target: &Event,
        fields: EventFields,
        image: Option<ImageUpload>,
    ) -> Result<(), GatewayError>;
    async fn delete_event(&self, id: EventId) -> Result<(), GatewayError>;
    /// Raw bytes of a banner image; `url` is already absolute.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, GatewayError>;
}

pub struct HttpEventGateway {
    http: Client,
    base_url: String,
}

impl HttpEventGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EventGateway for HttpEventGateway {
    async fn list_events(&self) -> Result<Vec<Event>, GatewayError> {
        let response = self
            .http
            .get(format!("{}/api/data", self.base_url))
            .send()
            .await?;
        let response = ensure_success(response, "fetch events").await?;
        let envelope: EventListEnvelope = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let events = envelope.into_events();
        info!(count = events.len(), "events: fetched list");
        Ok(events)
    }

    async fn create_event(
        &self,
        fields: EventFields,
        image: Option<ImageUpload>,
    ) -> Result<(), GatewayError> {
        validate_fields(&fields)?;
        let image = image.ok_or(ValidationError::MissingImage)?;

        let form = event_form(&fields).part(IMAGE_FORM_KEY, image_part(image)?);
        let response = self
            .http
            .post(format!("{}/api/create/event", self.base_url))
            .multipart(form)
            .send()
            .await?;
        ensure_success(response, "create event").await?;
        info!(name = %fields.event_name, "events: created");
        Ok(())
    }

    async fn update_event(
        &self,
        target: &Event,
        fields: EventFields,
        image: Option<ImageUpload>,
    ) -> Result<(), GatewayError> {
        validate_fields(&fields)?;

        let form = match (image, target.image_ref.as_deref()) {
            (Some(image), _) => event_form(&fields).part(IMAGE_FORM_KEY, image_part(image)?),
            (None, Some(existing)) if target.has_image() => {
                event_form(&fields).text(RETAINED_IMAGE_FORM_KEY, existing.to_string())
            }
            (None, _) => return Err(ValidationError::MissingImage.into()),
        };

        let response = self
            .http
            .put(format!(
                "{}/api/events/update/{}",
                self.base_url, target.id
            ))
            .multipart(form)
            .send()
            .await?;
        ensure_success(response, "update event").await?;
        info!(event_id = target.id.0, "events: updated");
        Ok(())
    }

    async fn delete_event(&self, id: EventId) -> Result<(), GatewayError> {
        let response = self
            .http
            .delete(format!("{}/api/events/delete/{id}", self.base_url))
            .send()
            .await?;
        ensure_success(response, "delete event").await?;
        info!(event_id = id.0, "events: deleted");
        Ok(())
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, GatewayError> {
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response, "fetch image").await?;
        let bytes = response.bytes().await?;
        debug!(url, size = bytes.len(), "events: fetched image");
        Ok(bytes.to_vec())
    }
}

/// Absolute URLs pass through; backend-relative paths are prefixed with the base URL.
pub fn resolve_image_url(base_url: &str, image_ref: Option<&str>) -> Option<String> {
    let image_ref = image_ref.map(str::trim).filter(|r| !r.is_empty())?;
    if image_ref.starts_with("http") {
        return Some(image_ref.to_string());
    }

    let base_url = base_url.trim_end_matches('/');
    if image_ref.starts_with('/') {
        Some(format!("{base_url}{image_ref}"))
    } else {
        Some(format!("{base_url}/{image_ref}"))
    }
}

fn event_form(fields: &EventFields) -> Form {
    fields
        .form_pairs()
        .fold(Form::new(), |form, (key, value)| {
            form.text(key, value.to_string())
        })
}

fn image_part(image: ImageUpload) -> Result<Part, GatewayError> {
    Ok(Part::bytes(image.bytes)
        .file_name(image.filename)
        .mime_str(image.mime.as_str())?)
}

async fn ensure_success(response: Response, action: &str) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = ApiError::message_from_body(&body)
        .unwrap_or_else(|| format!("Failed to {action}: {}", status.as_u16()));
    warn!(status = status.as_u16(), action, %message, "events: request failed");
    Err(GatewayError::Server {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
