//! Banner images fetched from the backend, one texture per URL.

use std::collections::HashMap;

use eframe::egui;

use crate::{
    backend_bridge::commands::BackendCommand, controller::events::UiError,
    ui::event_form::decode_preview,
};

const BANNER_MAX_DIMENSION: f32 = 240.0;

enum RemoteImage {
    Loading,
    Decoded(egui::ColorImage),
    Ready(egui::TextureHandle),
    Failed(String),
}

pub enum ImageSlot<'a> {
    Loading,
    Ready(&'a egui::TextureHandle),
    Failed(&'a str),
}

/// Each URL is requested once per session. Results for URLs the cache no
/// longer tracks (after `clear`) are dropped.
#[derive(Default)]
pub struct RemoteImageCache {
    entries: HashMap<String, RemoteImage>,
    requests: Vec<BackendCommand>,
}

impl RemoteImageCache {
    pub fn slot(&mut self, ctx: &egui::Context, url: &str) -> ImageSlot<'_> {
        if !self.entries.contains_key(url) {
            self.entries.insert(url.to_string(), RemoteImage::Loading);
            self.requests.push(BackendCommand::FetchImage {
                url: url.to_string(),
            });
        }
        let Some(entry) = self.entries.get_mut(url) else {
            return ImageSlot::Loading;
        };

        if matches!(entry, RemoteImage::Decoded(_)) {
            if let RemoteImage::Decoded(image) = std::mem::replace(entry, RemoteImage::Loading) {
                *entry = RemoteImage::Ready(ctx.load_texture(
                    format!("event-banner:{url}"),
                    image,
                    egui::TextureOptions::LINEAR,
                ));
            }
        }

        match entry {
            RemoteImage::Loading | RemoteImage::Decoded(_) => ImageSlot::Loading,
            RemoteImage::Ready(texture) => ImageSlot::Ready(texture),
            RemoteImage::Failed(message) => ImageSlot::Failed(message),
        }
    }

    pub fn store_bytes(&mut self, url: &str, bytes: &[u8]) {
        let Some(entry) = self.entries.get_mut(url) else {
            tracing::debug!(url, "dropping image for untracked url");
            return;
        };
        *entry = match decode_preview(bytes) {
            Ok(image) => RemoteImage::Decoded(image),
            Err(err) => {
                tracing::warn!(url, "banner decode failed: {err}");
                RemoteImage::Failed(format!("Image unavailable: {err}"))
            }
        };
    }

    pub fn store_failure(&mut self, url: &str, error: &UiError) {
        if let Some(entry) = self.entries.get_mut(url) {
            tracing::warn!(url, error = %error.message(), "banner fetch failed");
            *entry = RemoteImage::Failed(format!("Image unavailable: {}", error.message()));
        }
    }

    pub fn take_requests(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.requests)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.requests.clear();
    }
}

/// Draws the image behind `url`: a spinner while it loads, a placeholder if it
/// could not be fetched or decoded.
pub fn show_remote_image(ui: &mut egui::Ui, images: &mut RemoteImageCache, url: &str) {
    let max = egui::vec2(BANNER_MAX_DIMENSION, BANNER_MAX_DIMENSION);
    match images.slot(ui.ctx(), url) {
        ImageSlot::Ready(texture) => {
            ui.add(egui::Image::new(texture).max_size(max));
        }
        ImageSlot::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.weak("Loading image...");
            });
        }
        ImageSlot::Failed(message) => {
            let message = message.to_string();
            egui::Frame::group(ui.style())
                .corner_radius(6.0)
                .inner_margin(egui::Margin::symmetric(10, 18))
                .show(ui, |ui| {
                    ui.set_width(BANNER_MAX_DIMENSION);
                    ui.vertical_centered(|ui| ui.weak(message))
                        .response
                        .on_hover_text(url);
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::controller::events::UiErrorContext;

    const URL: &str = "http://127.0.0.1:5000/uploads/jazz.png";

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(4, 4, image::Rgba([20, 120, 200, 255]));
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn each_url_is_requested_once() {
        let ctx = egui::Context::default();
        let mut images = RemoteImageCache::default();

        assert!(matches!(images.slot(&ctx, URL), ImageSlot::Loading));
        assert!(matches!(images.slot(&ctx, URL), ImageSlot::Loading));

        assert_eq!(
            images.take_requests(),
            vec![BackendCommand::FetchImage { url: URL.into() }]
        );
        assert!(images.take_requests().is_empty());
    }

    #[test]
    fn decoded_bytes_become_a_texture() {
        let ctx = egui::Context::default();
        let mut images = RemoteImageCache::default();
        images.slot(&ctx, URL);

        images.store_bytes(URL, &png_bytes());

        match images.slot(&ctx, URL) {
            ImageSlot::Ready(texture) => assert_eq!(texture.size(), [4, 4]),
            _ => panic!("expected a texture"),
        }
    }

    #[test]
    fn undecodable_or_missing_images_fall_back_to_placeholder() {
        let ctx = egui::Context::default();
        let mut images = RemoteImageCache::default();
        let missing = "http://127.0.0.1:5000/uploads/gone.png";
        images.slot(&ctx, URL);
        images.slot(&ctx, missing);

        images.store_bytes(URL, b"not an image");
        images.store_failure(
            missing,
            &UiError::from_message(UiErrorContext::FetchImage, "Failed to fetch image: 404"),
        );

        assert!(matches!(images.slot(&ctx, URL), ImageSlot::Failed(_)));
        match images.slot(&ctx, missing) {
            ImageSlot::Failed(message) => {
                assert_eq!(message, "Image unavailable: Failed to fetch image: 404")
            }
            _ => panic!("expected a placeholder"),
        }
    }

    #[test]
    fn results_after_clear_are_dropped() {
        let ctx = egui::Context::default();
        let mut images = RemoteImageCache::default();
        images.slot(&ctx, URL);
        images.clear();

        images.store_bytes(URL, &png_bytes());

        assert!(images.take_requests().is_empty());
        assert!(matches!(images.slot(&ctx, URL), ImageSlot::Loading));
        assert_eq!(images.take_requests().len(), 1);
    }
}
