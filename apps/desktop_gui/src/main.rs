use std::sync::Arc;

mod backend_bridge;
mod controller;
mod forms;
mod ui;

use anyhow::Context;
use backend_bridge::{commands::BackendCommand, runtime};
use clap::Parser;
use client_core::{load_settings, HttpEventGateway};
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use ui::{EventDeskApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Desktop client for browsing and managing events")]
struct Args {
    /// Overrides the API base URL from events_client.toml and the environment.
    #[arg(long)]
    api_base_url: Option<String>,
    /// Signs in with this display name on startup.
    #[arg(long)]
    display_name: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(raw) = args.api_base_url.as_deref() {
        settings = settings.with_api_base_url(raw)?;
    }
    tracing::info!(api_base_url = %settings.api_base_url, "starting desktop client");

    let gateway = HttpEventGateway::from_settings(&settings)
        .context("failed to build HTTP client")?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(cmd_rx, ui_tx, Arc::new(gateway));

    let startup = StartupConfig {
        api_base_url: settings.api_base_url.clone(),
        display_name: args.display_name,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Event Desk")
            .with_inner_size([1024.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Event Desk",
        options,
        Box::new(|_cc| Ok(Box::new(EventDeskApp::new(cmd_tx, ui_rx, startup)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop client exited with error: {err}"))
}
