//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::EventGateway;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Starts the backend worker thread. Each command runs as its own task, so a
/// slow request never holds up the ones queued behind it.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    gateway: Arc<dyn EventGateway>,
) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                let gateway = Arc::clone(&gateway);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let name = cmd.name();
                    let event = execute_command(gateway.as_ref(), cmd).await;
                    if ui_tx.try_send(event).is_err() {
                        tracing::warn!(command = name, "ui event queue unavailable; result dropped");
                    }
                });
            }

            tracing::info!("backend command queue closed; worker exiting");
        });
    });
}

/// Runs one command against the gateway and turns the outcome into the event
/// the controller expects.
pub async fn execute_command(gateway: &dyn EventGateway, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::FetchEvents { ticket } => match gateway.list_events().await {
            Ok(events) => UiEvent::EventsLoaded { ticket, events },
            Err(err) => UiEvent::EventsLoadFailed {
                ticket,
                error: UiError::from_gateway(UiErrorContext::FetchEvents, &err),
            },
        },
        BackendCommand::CreateEvent {
            submission,
            fields,
            image,
        } => match gateway.create_event(fields, image).await {
            Ok(()) => UiEvent::EventCreated { submission },
            Err(err) => UiEvent::SubmitFailed {
                submission,
                error: UiError::from_gateway(UiErrorContext::CreateEvent, &err),
            },
        },
        BackendCommand::UpdateEvent {
            submission,
            target,
            fields,
            image,
        } => match gateway.update_event(&target, fields, image).await {
            Ok(()) => UiEvent::EventUpdated {
                submission,
                id: target.id,
            },
            Err(err) => UiEvent::SubmitFailed {
                submission,
                error: UiError::from_gateway(UiErrorContext::UpdateEvent, &err),
            },
        },
        BackendCommand::DeleteEvent { id } => match gateway.delete_event(id).await {
            Ok(()) => UiEvent::EventDeleted { id },
            Err(err) => UiEvent::Error(UiError::from_gateway(UiErrorContext::DeleteEvent, &err)),
        },
        BackendCommand::FetchImage { url } => match gateway.fetch_image(&url).await {
            Ok(bytes) => UiEvent::ImageLoaded { url, bytes },
            Err(err) => UiEvent::ImageLoadFailed {
                url,
                error: UiError::from_gateway(UiErrorContext::FetchImage, &err),
            },
        },
    }
}
