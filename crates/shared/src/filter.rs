//! Client-side event filtering over a fetched snapshot.

use chrono::NaiveDateTime;

use crate::domain::Event;

/// Active filters; an empty string or `None` disables that filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub location: String,
    pub category: String,
    pub instant: Option<NaiveDateTime>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.location.is_empty() && self.category.is_empty() && self.instant.is_none()
    }

    pub fn matches(&self, event: &Event) -> bool {
        let location_ok = self.location.is_empty() || event.location == self.location;
        let category_ok = self.category.is_empty() || event.category == self.category;
        let instant_ok = self
            .instant
            .map_or(true, |instant| event.is_active_at(instant));

        location_ok && category_ok && instant_ok
    }
}

/// Returns the events matching every active filter, in their original order.
pub fn apply_filters(events: &[Event], criteria: &FilterCriteria) -> Vec<Event> {
    if criteria.is_empty() {
        return events.to_vec();
    }

    events
        .iter()
        .filter(|event| criteria.matches(event))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
