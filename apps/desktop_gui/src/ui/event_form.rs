//! Create/update form view and the staged-image preview texture.

use eframe::egui;
use image::GenericImageView;
use client_core::resolve_image_url;
use shared::domain::EventField;

use crate::{
    controller::reducer::UiAction,
    forms::EventForm,
    ui::remote_images::{show_remote_image, RemoteImageCache},
};

const PREVIEW_MAX_DIMENSION: f32 = 240.0;

/// Holds at most one preview texture, keyed by the form's preview revision.
/// The texture is released as soon as the revision moves on or the form closes.
#[derive(Default)]
pub struct PreviewCache {
    revision: Option<u64>,
    texture: Option<egui::TextureHandle>,
    error: Option<String>,
}

impl PreviewCache {
    pub fn sync(&mut self, ctx: &egui::Context, form: &EventForm) {
        let revision = form.preview_revision();
        if self.revision == Some(revision) {
            return;
        }

        self.clear();
        self.revision = Some(revision);
        let Some(upload) = form.staged_image() else {
            return;
        };
        match decode_preview(&upload.bytes) {
            Ok(color_image) => {
                self.texture = Some(ctx.load_texture(
                    format!("event-image-preview:{revision}"),
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
            Err(err) => {
                tracing::warn!(filename = %upload.filename, "preview decode failed: {err}");
                self.error = Some(format!("Preview unavailable: {err}"));
            }
        }
    }

    pub fn clear(&mut self) {
        self.revision = None;
        self.texture = None;
        self.error = None;
    }

    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }
}

/// Decodes image bytes and scales them down to thumbnail size.
pub fn decode_preview(bytes: &[u8]) -> Result<egui::ColorImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let (orig_w, orig_h) = decoded.dimensions();
    let scale = (PREVIEW_MAX_DIMENSION / (orig_w.max(orig_h).max(1) as f32)).min(1.0);
    let resized = if scale < 1.0 {
        decoded.resize(
            (orig_w as f32 * scale).max(1.0) as u32,
            (orig_h as f32 * scale).max(1.0) as u32,
            image::imageops::FilterType::Triangle,
        )
    } else {
        decoded
    };
    let rgba = resized.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

pub fn field_title(field: EventField) -> String {
    let label = field.label();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn show(
    ui: &mut egui::Ui,
    form: &EventForm,
    preview: &mut PreviewCache,
    images: &mut RemoteImageCache,
    api_base_url: &str,
) -> Vec<UiAction> {
    let mut actions = Vec::new();
    preview.sync(ui.ctx(), form);

    ui.heading(if form.is_update() {
        "Update Event"
    } else {
        "Create Event"
    });
    ui.add_space(6.0);

    if let Some(error) = form.error() {
        ui.colored_label(ui.visuals().error_fg_color, error);
        ui.add_space(4.0);
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("event_form_fields")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    for field in EventField::ALL {
                        ui.label(field_title(field));
                        let mut value = form.value(field).to_string();
                        let editor = if field == EventField::Description {
                            egui::TextEdit::multiline(&mut value).desired_rows(4)
                        } else if field.is_timestamp() {
                            egui::TextEdit::singleline(&mut value).hint_text("YYYY-MM-DDTHH:MM")
                        } else {
                            egui::TextEdit::singleline(&mut value)
                        };
                        if ui.add(editor.desired_width(360.0)).changed() {
                            actions.push(UiAction::EditField { field, value });
                        }
                        ui.end_row();
                    }
                });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Choose image...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Images", &["png", "jpg", "jpeg", "gif"])
                        .pick_file()
                    {
                        actions.push(UiAction::StageImage(path));
                    }
                }
                match (form.staged_image(), form.existing_image()) {
                    (Some(upload), _) => {
                        ui.label(format!("{} ({} bytes)", upload.filename, upload.size_bytes()));
                    }
                    (None, Some(existing)) => {
                        ui.weak(format!("Keeping current image: {existing}"));
                    }
                    (None, None) => {
                        ui.weak("No image selected");
                    }
                }
            });

            if let Some(texture) = preview.texture() {
                ui.add(
                    egui::Image::new(texture)
                        .max_size(egui::vec2(PREVIEW_MAX_DIMENSION, PREVIEW_MAX_DIMENSION)),
                );
            } else if let Some(err) = &preview.error {
                ui.weak(err);
            } else if form.staged_image().is_none() {
                if let Some(url) = resolve_image_url(api_base_url, form.existing_image()) {
                    show_remote_image(ui, images, &url);
                }
            }

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                let submit_label = if form.is_update() { "Update" } else { "Create" };
                if ui
                    .add_enabled(form.can_submit(), egui::Button::new(submit_label))
                    .clicked()
                {
                    actions.push(UiAction::Submit);
                }
                if ui.button("Cancel").clicked() {
                    actions.push(UiAction::Cancel);
                }
                if form.is_submitting() {
                    ui.spinner();
                }
            });
        });

    actions
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn small_images_keep_their_size() {
        let preview = decode_preview(&png_bytes(3, 2)).expect("decode");
        assert_eq!(preview.size, [3, 2]);
    }

    #[test]
    fn large_images_are_scaled_to_thumbnail() {
        let preview = decode_preview(&png_bytes(480, 120)).expect("decode");
        assert_eq!(preview.size, [240, 60]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_preview(b"definitely not an image").is_err());
    }

    #[test]
    fn field_titles_are_capitalized_labels() {
        assert_eq!(field_title(EventField::EventName), "Event name");
        assert_eq!(field_title(EventField::EndTime), "End time");
    }
}
