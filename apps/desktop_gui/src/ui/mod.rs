//! UI layer for desktop GUI: app shell, event list, create/update form, and banner images.

pub mod app;
pub mod event_form;
pub mod event_list;
pub mod remote_images;

pub use app::{EventDeskApp, StartupConfig};
