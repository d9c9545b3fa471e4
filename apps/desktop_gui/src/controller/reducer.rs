//! Event list controller: view state machine, filter state, and the commands each transition issues.

use std::{collections::BTreeSet, path::PathBuf};

use chrono::NaiveDateTime;
use shared::{
    domain::{Event, EventField, EventId},
    filter::{apply_filters, FilterCriteria},
};

use crate::{
    backend_bridge::commands::{BackendCommand, FetchTicket, SubmitTicket},
    controller::events::{UiError, UiErrorContext, UiEvent},
    forms::EventForm,
};

#[derive(Debug, Clone)]
pub enum ViewState {
    Listing,
    Creating(EventForm),
    Editing { target: Event, form: EventForm },
}

impl ViewState {
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Listing => "listing",
            ViewState::Creating(_) => "creating",
            ViewState::Editing { .. } => "editing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Mount,
    Create,
    Edit(Event),
    Cancel,
    Submit,
    Delete(EventId),
    EditField { field: EventField, value: String },
    StageImage(PathBuf),
    SetLocationFilter(String),
    SetCategoryFilter(String),
    SetInstantFilter(Option<NaiveDateTime>),
    ClearFilters,
    RetryFetch,
    DismissNotice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Owns the fetched snapshot, the active filters and the current view.
///
/// Only [`EventListController::apply`] and [`EventListController::handle_event`]
/// mutate it; both return the backend commands the transition requires.
#[derive(Debug)]
pub struct EventListController {
    view: ViewState,
    events: Vec<Event>,
    criteria: FilterCriteria,
    next_ticket: u64,
    next_submission: u64,
    latest_applied: Option<FetchTicket>,
    in_flight: BTreeSet<FetchTicket>,
    list_error: Option<UiError>,
    notice: Option<Notice>,
}

impl Default for EventListController {
    fn default() -> Self {
        Self::new()
    }
}

impl EventListController {
    pub fn new() -> Self {
        Self {
            view: ViewState::Listing,
            events: Vec::new(),
            criteria: FilterCriteria::default(),
            next_ticket: 0,
            next_submission: 0,
            latest_applied: None,
            in_flight: BTreeSet::new(),
            list_error: None,
            notice: None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn form(&self) -> Option<&EventForm> {
        match &self.view {
            ViewState::Listing => None,
            ViewState::Creating(form) | ViewState::Editing { form, .. } => Some(form),
        }
    }

    fn form_mut(&mut self) -> Option<&mut EventForm> {
        match &mut self.view {
            ViewState::Listing => None,
            ViewState::Creating(form) | ViewState::Editing { form, .. } => Some(form),
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn visible_events(&self) -> Vec<Event> {
        apply_filters(&self.events, &self.criteria)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn list_error(&self) -> Option<&UiError> {
        self.list_error.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Drops everything tied to the signed-in session. Responses to
    /// requests issued before the reset are ignored when they arrive.
    pub fn reset(&mut self) {
        let latest_applied = Some(FetchTicket(self.next_ticket));
        *self = Self {
            next_ticket: self.next_ticket,
            next_submission: self.next_submission,
            latest_applied,
            ..Self::new()
        };
    }

    fn fetch(&mut self) -> BackendCommand {
        self.next_ticket += 1;
        let ticket = FetchTicket(self.next_ticket);
        self.in_flight.insert(ticket);
        self.list_error = None;
        BackendCommand::FetchEvents { ticket }
    }

    fn return_to_listing(&mut self) -> Vec<BackendCommand> {
        self.view = ViewState::Listing;
        vec![self.fetch()]
    }

    pub fn apply(&mut self, action: UiAction) -> Vec<BackendCommand> {
        tracing::debug!(view = self.view.name(), ?action, "controller: action");
        match action {
            UiAction::Mount => vec![self.fetch()],
            UiAction::RetryFetch => {
                if self.list_error.is_some() {
                    vec![self.fetch()]
                } else {
                    Vec::new()
                }
            }
            UiAction::Create => {
                if matches!(self.view, ViewState::Listing) {
                    self.notice = None;
                    self.view = ViewState::Creating(EventForm::create());
                }
                Vec::new()
            }
            UiAction::Edit(target) => {
                if matches!(self.view, ViewState::Listing) {
                    self.notice = None;
                    let form = EventForm::update(&target);
                    self.view = ViewState::Editing { target, form };
                }
                Vec::new()
            }
            UiAction::Cancel => match self.view {
                ViewState::Listing => Vec::new(),
                ViewState::Creating(_) | ViewState::Editing { .. } => self.return_to_listing(),
            },
            UiAction::Submit => self.submit(),
            UiAction::Delete(id) => {
                if matches!(self.view, ViewState::Listing) {
                    self.notice = None;
                    vec![BackendCommand::DeleteEvent { id }]
                } else {
                    Vec::new()
                }
            }
            UiAction::EditField { field, value } => {
                if let Some(form) = self.form_mut() {
                    let _ = form.set_field(field, value);
                }
                Vec::new()
            }
            UiAction::StageImage(path) => {
                if let Some(form) = self.form_mut() {
                    form.stage_image_file(&path);
                }
                Vec::new()
            }
            UiAction::SetLocationFilter(location) => {
                self.criteria.location = location;
                Vec::new()
            }
            UiAction::SetCategoryFilter(category) => {
                self.criteria.category = category;
                Vec::new()
            }
            UiAction::SetInstantFilter(instant) => {
                self.criteria.instant = instant;
                Vec::new()
            }
            UiAction::ClearFilters => {
                self.criteria = FilterCriteria::default();
                Vec::new()
            }
            UiAction::DismissNotice => {
                self.notice = None;
                Vec::new()
            }
        }
    }

    fn submit(&mut self) -> Vec<BackendCommand> {
        let submission = SubmitTicket(self.next_submission + 1);
        let cmd = match &mut self.view {
            ViewState::Listing => None,
            ViewState::Creating(form) => form.submit(submission).ok().map(|payload| {
                BackendCommand::CreateEvent {
                    submission,
                    fields: payload.fields,
                    image: payload.image,
                }
            }),
            ViewState::Editing { target, form } => {
                form.submit(submission).ok().map(|payload| BackendCommand::UpdateEvent {
                    submission,
                    target: target.clone(),
                    fields: payload.fields,
                    image: payload.image,
                })
            }
        };
        if cmd.is_some() {
            self.next_submission = submission.0;
        }
        cmd.into_iter().collect()
    }

    fn awaiting_form(&mut self, submission: SubmitTicket) -> Option<&mut EventForm> {
        self.form_mut().filter(|form| form.awaits(submission))
    }

    pub fn handle_event(&mut self, event: UiEvent) -> Vec<BackendCommand> {
        match event {
            UiEvent::Info(_) | UiEvent::ImageLoaded { .. } | UiEvent::ImageLoadFailed { .. } => {
                Vec::new()
            }
            UiEvent::EventsLoaded { ticket, events } => {
                if self.accept_fetch_result(ticket) {
                    tracing::debug!(ticket = ticket.0, count = events.len(), "controller: snapshot applied");
                    self.events = events;
                    self.list_error = None;
                }
                Vec::new()
            }
            UiEvent::EventsLoadFailed { ticket, error } => {
                if self.accept_fetch_result(ticket) {
                    self.list_error = Some(error);
                }
                Vec::new()
            }
            UiEvent::EventCreated { submission } => {
                self.finish_submission(submission, "Event created successfully")
            }
            UiEvent::EventUpdated { submission, id } => {
                tracing::debug!(event_id = id.0, "controller: update confirmed");
                self.finish_submission(submission, "Event updated successfully")
            }
            UiEvent::SubmitFailed { submission, error } => {
                if let Some(form) = self.awaiting_form(submission) {
                    form.fail(error.message());
                } else {
                    self.notice = Some(Notice::error(error.display()));
                }
                Vec::new()
            }
            UiEvent::EventDeleted { .. } => {
                self.notice = Some(Notice::success("Event deleted successfully"));
                vec![self.fetch()]
            }
            UiEvent::Error(error) => {
                self.handle_error(error);
                Vec::new()
            }
        }
    }

    /// A create/update succeeded. The form that sent it returns to the list;
    /// if that form is already gone the list is still refreshed.
    fn finish_submission(
        &mut self,
        submission: SubmitTicket,
        message: &str,
    ) -> Vec<BackendCommand> {
        self.notice = Some(Notice::success(message));
        if let Some(form) = self.awaiting_form(submission) {
            form.reset();
            self.view = ViewState::Listing;
        }
        vec![self.fetch()]
    }

    fn handle_error(&mut self, error: UiError) {
        match error.context() {
            UiErrorContext::FetchEvents => self.list_error = Some(error),
            _ => self.notice = Some(Notice::error(error.display())),
        }
    }

    fn accept_fetch_result(&mut self, ticket: FetchTicket) -> bool {
        self.in_flight.remove(&ticket);
        if self.latest_applied.is_some_and(|latest| ticket <= latest) {
            tracing::debug!(ticket = ticket.0, "controller: dropping stale fetch result");
            return false;
        }
        self.latest_applied = Some(ticket);
        true
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
