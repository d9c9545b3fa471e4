//! App shell: sign-in gate, navigation bar, and the bridge between egui and the controller.

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::UiEvent,
        orchestration::dispatch_all,
        reducer::{EventListController, UiAction, ViewState},
    },
    ui::{
        event_form::{self, PreviewCache},
        event_list::{self, ListUiState},
        remote_images::RemoteImageCache,
    },
};

const MAX_DISPLAY_NAME_CHARS: usize = 50;

#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    pub api_base_url: String,
    pub display_name: Option<String>,
}

/// Trims and checks a sign-in name.
pub fn normalize_display_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("Enter a display name to continue".to_string());
    }
    if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(format!(
            "Display name must be at most {MAX_DISPLAY_NAME_CHARS} characters"
        ));
    }
    Ok(name.to_string())
}

pub struct EventDeskApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    api_base_url: String,
    signed_in_as: Option<String>,
    sign_in_input: String,
    sign_in_error: Option<String>,
    controller: EventListController,
    list_ui: ListUiState,
    preview: PreviewCache,
    images: RemoteImageCache,
    status: String,
}

impl EventDeskApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            api_base_url: startup.api_base_url,
            signed_in_as: None,
            sign_in_input: String::new(),
            sign_in_error: None,
            controller: EventListController::new(),
            list_ui: ListUiState::default(),
            preview: PreviewCache::default(),
            images: RemoteImageCache::default(),
            status: "Not signed in".to_string(),
        };
        if let Some(name) = startup.display_name {
            app.sign_in_input = name;
            app.sign_in();
        }
        app
    }

    fn sign_in(&mut self) {
        match normalize_display_name(&self.sign_in_input) {
            Ok(name) => {
                tracing::info!(display_name = %name, "signed in");
                self.status = format!("Signed in as {name}");
                self.signed_in_as = Some(name);
                self.sign_in_error = None;
                self.apply(UiAction::Mount);
            }
            Err(err) => self.sign_in_error = Some(err),
        }
    }

    fn sign_out(&mut self) {
        tracing::info!("signed out");
        self.signed_in_as = None;
        self.sign_in_input.clear();
        self.controller.reset();
        self.list_ui.clear();
        self.preview.clear();
        self.images.clear();
        self.status = "Signed out".to_string();
    }

    fn apply(&mut self, action: UiAction) {
        let cmds = self.controller.apply(action);
        dispatch_all(&self.cmd_tx, cmds, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            if let UiEvent::Info(message) = &event {
                self.status = message.clone();
                continue;
            }
            let event = match event {
                UiEvent::ImageLoaded { url, bytes } => {
                    self.images.store_bytes(&url, &bytes);
                    continue;
                }
                UiEvent::ImageLoadFailed { url, error } => {
                    self.images.store_failure(&url, &error);
                    continue;
                }
                other => other,
            };
            if self.signed_in_as.is_none() {
                tracing::debug!(?event, "dropping backend result received while signed out");
                continue;
            }
            let cmds = self.controller.handle_event(event);
            dispatch_all(&self.cmd_tx, cmds, &mut self.status);
        }
    }

    fn show_sign_in_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let avail = ui.available_size();
            ui.add_space((avail.y * 0.18).clamp(18.0, 120.0));

            ui.vertical_centered(|ui| {
                ui.set_width(avail.x.clamp(320.0, 420.0));
                egui::Frame::group(ui.style())
                    .corner_radius(14.0)
                    .inner_margin(egui::Margin::symmetric(20, 18))
                    .show(ui, |ui| {
                        ui.heading("Event Desk");
                        ui.weak("Sign in to manage events.");
                        ui.add_space(10.0);

                        let response = ui.add(
                            egui::TextEdit::singleline(&mut self.sign_in_input)
                                .hint_text("Display name")
                                .desired_width(f32::INFINITY),
                        );
                        let submitted = response.lost_focus()
                            && ui.input(|input| input.key_pressed(egui::Key::Enter));

                        if let Some(err) = &self.sign_in_error {
                            ui.colored_label(ui.visuals().error_fg_color, err);
                        }

                        ui.add_space(6.0);
                        if ui.button("Sign in").clicked() || submitted {
                            self.sign_in();
                        }
                    });
            });
        });
    }

    fn show_nav_bar(&mut self, ctx: &egui::Context) {
        let mut sign_out = false;
        egui::TopBottomPanel::top("nav_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Event Desk");
                ui.separator();
                ui.weak(&self.api_base_url);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Sign out").clicked() {
                        sign_out = true;
                    }
                    if let Some(name) = &self.signed_in_as {
                        ui.label(name);
                    }
                });
            });
        });
        if sign_out {
            self.sign_out();
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.weak(&self.status);
        });
    }

    fn show_workspace(&mut self, ctx: &egui::Context) {
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| match self.controller.view() {
                ViewState::Listing => {
                    self.preview.clear();
                    event_list::show(
                        ui,
                        &self.controller,
                        &mut self.list_ui,
                        &mut self.images,
                        &self.api_base_url,
                    )
                }
                ViewState::Creating(form) | ViewState::Editing { form, .. } => event_form::show(
                    ui,
                    form,
                    &mut self.preview,
                    &mut self.images,
                    &self.api_base_url,
                ),
            })
            .inner;

        for action in actions {
            self.apply(action);
        }
        self.request_images();
    }

    fn request_images(&mut self) {
        let requests = self.images.take_requests();
        dispatch_all(&self.cmd_tx, requests, &mut self.status);
    }
}

impl eframe::App for EventDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        if self.signed_in_as.is_some() {
            self.show_nav_bar(ctx);
        }
        self.show_status_bar(ctx);

        if self.signed_in_as.is_some() {
            self.show_workspace(ctx);
        } else {
            self.show_sign_in_screen(ctx);
        }

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend_bridge::commands::FetchTicket;
    use crossbeam_channel::bounded;
    use shared::domain::{Event, EventId};

    fn app_with_channels() -> (
        EventDeskApp,
        Receiver<BackendCommand>,
        Sender<UiEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(16);
        let (ui_tx, ui_rx) = bounded(16);
        let app = EventDeskApp::new(
            cmd_tx,
            ui_rx,
            StartupConfig {
                api_base_url: "http://127.0.0.1:5000".into(),
                display_name: None,
            },
        );
        (app, cmd_rx, ui_tx)
    }

    fn sample_event() -> Event {
        Event {
            id: EventId(1),
            name: "Jazz Night".into(),
            start_time: "2024-01-01T10:00".into(),
            end_time: "2024-01-01T12:00".into(),
            location: "Ahmedabad".into(),
            description: "Live music".into(),
            category: "Music".into(),
            image_ref: None,
        }
    }

    #[test]
    fn display_names_are_trimmed_and_bounded() {
        assert_eq!(normalize_display_name("  Asha "), Ok("Asha".to_string()));
        assert!(normalize_display_name("   ").is_err());
        assert!(normalize_display_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn signing_in_mounts_the_list() {
        let (mut app, cmd_rx, _ui_tx) = app_with_channels();
        assert!(cmd_rx.try_recv().is_err());

        app.sign_in_input = "Asha".into();
        app.sign_in();

        assert_eq!(app.signed_in_as.as_deref(), Some("Asha"));
        assert_eq!(
            cmd_rx.try_recv().expect("fetch queued"),
            BackendCommand::FetchEvents {
                ticket: FetchTicket(1)
            }
        );
    }

    #[test]
    fn blank_sign_in_is_rejected_without_fetching() {
        let (mut app, cmd_rx, _ui_tx) = app_with_channels();
        app.sign_in_input = "  ".into();
        app.sign_in();

        assert!(app.signed_in_as.is_none());
        assert!(app.sign_in_error.is_some());
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn backend_results_flow_into_the_controller() {
        let (mut app, cmd_rx, ui_tx) = app_with_channels();
        app.sign_in_input = "Asha".into();
        app.sign_in();
        let _ = cmd_rx.try_recv();

        ui_tx
            .send(UiEvent::EventsLoaded {
                ticket: FetchTicket(1),
                events: vec![sample_event()],
            })
            .expect("send event");
        ui_tx
            .send(UiEvent::EventDeleted { id: EventId(1) })
            .expect("send event");
        app.process_ui_events();

        assert_eq!(app.controller.events().len(), 1);
        assert!(matches!(
            cmd_rx.try_recv().expect("refetch after delete"),
            BackendCommand::FetchEvents { .. }
        ));
    }

    #[test]
    fn banner_requests_are_queued_and_results_land_in_the_cache() {
        use crate::ui::remote_images::ImageSlot;

        let (mut app, cmd_rx, ui_tx) = app_with_channels();
        app.sign_in_input = "Asha".into();
        app.sign_in();
        let _ = cmd_rx.try_recv();
        let ctx = egui::Context::default();
        let url = "http://127.0.0.1:5000/uploads/1.png";

        assert!(matches!(app.images.slot(&ctx, url), ImageSlot::Loading));
        app.request_images();
        assert_eq!(
            cmd_rx.try_recv().expect("image fetch queued"),
            BackendCommand::FetchImage { url: url.into() }
        );

        ui_tx
            .send(UiEvent::ImageLoaded {
                url: url.into(),
                bytes: b"not an image".to_vec(),
            })
            .expect("send event");
        app.process_ui_events();

        assert!(matches!(app.images.slot(&ctx, url), ImageSlot::Failed(_)));
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn signing_out_discards_session_state_and_late_results() {
        let (mut app, cmd_rx, ui_tx) = app_with_channels();
        app.sign_in_input = "Asha".into();
        app.sign_in();
        let _ = cmd_rx.try_recv();

        app.sign_out();
        ui_tx
            .send(UiEvent::EventsLoaded {
                ticket: FetchTicket(1),
                events: vec![sample_event()],
            })
            .expect("send event");
        app.process_ui_events();

        assert!(app.signed_in_as.is_none());
        assert!(app.controller.events().is_empty());
        assert!(cmd_rx.try_recv().is_err());
    }
}
