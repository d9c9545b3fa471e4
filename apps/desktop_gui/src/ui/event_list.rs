//! Listing view: filter bar, event cards, and the list-level banners.

use chrono::NaiveDateTime;
use client_core::resolve_image_url;
use eframe::egui;
use shared::domain::{
    choice_label, parse_timestamp, Event, FilterChoice, CATEGORY_CHOICES, LOCATION_CHOICES,
};

use crate::{
    controller::reducer::{EventListController, NoticeKind, UiAction},
    ui::remote_images::{show_remote_image, RemoteImageCache},
};

const DISPLAY_TIMESTAMP_FORMAT: &str = "%d %b %Y, %H:%M";

/// Widget-local state that does not belong in the controller.
#[derive(Debug, Default)]
pub struct ListUiState {
    pub instant_input: String,
    pub instant_error: Option<String>,
}

impl ListUiState {
    pub fn clear(&mut self) {
        self.instant_input.clear();
        self.instant_error = None;
    }
}

/// Blank input clears the instant filter; anything else must parse.
pub fn parse_instant_input(raw: &str) -> Result<Option<NaiveDateTime>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_timestamp(trimmed)
        .map(Some)
        .ok_or_else(|| format!("Unrecognized date/time '{trimmed}', use YYYY-MM-DDTHH:MM"))
}

pub fn display_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(parsed) => parsed.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

pub fn show(
    ui: &mut egui::Ui,
    controller: &EventListController,
    state: &mut ListUiState,
    images: &mut RemoteImageCache,
    api_base_url: &str,
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.heading("Events");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Create Event").clicked() {
                actions.push(UiAction::Create);
            }
        });
    });
    ui.add_space(6.0);

    if let Some(notice) = controller.notice() {
        let fill = match notice.kind {
            NoticeKind::Success => egui::Color32::from_rgb(45, 95, 60),
            NoticeKind::Error => egui::Color32::from_rgb(111, 53, 53),
        };
        egui::Frame::NONE
            .fill(fill)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(&notice.message).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            actions.push(UiAction::DismissNotice);
                        }
                    });
                });
            });
        ui.add_space(6.0);
    }

    show_filter_bar(ui, controller, state, &mut actions);
    ui.separator();

    if controller.is_loading() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.weak("Loading events...");
        });
    }

    if let Some(error) = controller.list_error() {
        ui.colored_label(ui.visuals().error_fg_color, error.display());
        if ui.button("Retry").clicked() {
            actions.push(UiAction::RetryFetch);
        }
        return actions;
    }

    let visible = controller.visible_events();
    if visible.is_empty() {
        if controller.events().is_empty() {
            ui.weak("No events yet.");
        } else {
            ui.weak("No events match the current filters.");
        }
        return actions;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for event in &visible {
                show_event_card(ui, event, images, api_base_url, &mut actions);
                ui.add_space(8.0);
            }
        });

    actions
}

fn show_filter_bar(
    ui: &mut egui::Ui,
    controller: &EventListController,
    state: &mut ListUiState,
    actions: &mut Vec<UiAction>,
) {
    let criteria = controller.criteria();

    ui.horizontal_wrapped(|ui| {
        ui.label("Location");
        if let Some(value) = choice_combo(ui, "filter_location", LOCATION_CHOICES, &criteria.location) {
            actions.push(UiAction::SetLocationFilter(value));
        }

        ui.label("Category");
        if let Some(value) = choice_combo(ui, "filter_category", CATEGORY_CHOICES, &criteria.category) {
            actions.push(UiAction::SetCategoryFilter(value));
        }

        ui.label("Active at");
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.instant_input)
                .hint_text("YYYY-MM-DDTHH:MM")
                .desired_width(150.0),
        );
        if response.changed() {
            match parse_instant_input(&state.instant_input) {
                Ok(instant) => {
                    state.instant_error = None;
                    if instant != criteria.instant {
                        actions.push(UiAction::SetInstantFilter(instant));
                    }
                }
                Err(err) => state.instant_error = Some(err),
            }
        }

        if ui.button("Clear filters").clicked() {
            state.clear();
            actions.push(UiAction::ClearFilters);
        }
    });

    if let Some(err) = &state.instant_error {
        ui.colored_label(ui.visuals().warn_fg_color, err);
    }
}

fn choice_combo(
    ui: &mut egui::Ui,
    id: &str,
    choices: &[FilterChoice],
    current: &str,
) -> Option<String> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(choice_label(choices, current))
        .show_ui(ui, |ui| {
            for choice in choices {
                if ui
                    .selectable_label(choice.value == current, choice.label)
                    .clicked()
                    && choice.value != current
                {
                    picked = Some(choice.value.to_string());
                }
            }
        });
    picked
}

fn show_event_card(
    ui: &mut egui::Ui,
    event: &Event,
    images: &mut RemoteImageCache,
    api_base_url: &str,
    actions: &mut Vec<UiAction>,
) {
    egui::Frame::group(ui.style())
        .corner_radius(10.0)
        .inner_margin(egui::Margin::symmetric(14, 12))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(&event.name).strong().size(18.0));
            if !event.description.is_empty() {
                ui.label(&event.description);
            }

            egui::Grid::new(("event_details", event.id.0))
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.weak("Start");
                    ui.label(display_timestamp(&event.start_time));
                    ui.end_row();
                    ui.weak("End");
                    ui.label(display_timestamp(&event.end_time));
                    ui.end_row();
                    ui.weak("Location");
                    ui.label(&event.location);
                    ui.end_row();
                    ui.weak("Category");
                    ui.label(&event.category);
                    ui.end_row();
                });

            if let Some(url) = resolve_image_url(api_base_url, event.image_ref.as_deref()) {
                ui.add_space(4.0);
                show_remote_image(ui, images, &url);
            }

            ui.horizontal(|ui| {
                if ui.button("Edit").clicked() {
                    actions.push(UiAction::Edit(event.clone()));
                }
                if ui.button("Delete").clicked() {
                    actions.push(UiAction::Delete(event.id));
                }
            });
        });
}
