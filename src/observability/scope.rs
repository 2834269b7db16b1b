//! Begin/complete logging around a unit of work
//!
//! - `{EVENT}_BEGIN` on creation
//! - `{EVENT}_COMPLETE` on `complete` / `complete_with_fields`
//! - `{EVENT}_INCOMPLETE` at WARN if dropped before completing

use std::time::Instant;

use super::events::Event;
use super::logger::{Logger, Severity};

pub struct ObservationScope<'a> {
    logger: &'a Logger,
    event: Event,
    fields: Vec<(&'a str, String)>,
    completed: bool,
}

impl<'a> ObservationScope<'a> {
    pub fn new(logger: &'a Logger, event: Event) -> Self {
        Self::with_fields(logger, event, &[])
    }

    pub fn with_fields(logger: &'a Logger, event: Event, fields: &[(&'a str, &str)]) -> Self {
        let severity = event.severity();
        if logger.enabled(severity) {
            logger.log(severity, &format!("{}_BEGIN", event.as_str()), fields);
        }

        Self {
            logger,
            event,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            completed: false,
        }
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Logs `{EVENT}_COMPLETE` with the scope's fields plus `extra_fields`.
    pub fn complete_with_fields(mut self, extra_fields: &[(&str, &str)]) {
        self.completed = true;

        let severity = self.event.severity();
        if !self.logger.enabled(severity) {
            return;
        }
        let mut fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        fields.extend(extra_fields.iter().copied());

        self.logger.log(
            severity,
            &format!("{}_COMPLETE", self.event.as_str()),
            &fields,
        );
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.logger.log(
                Severity::Warn,
                &format!("{}_INCOMPLETE", self.event.as_str()),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Elapsed-time helper for scope fields
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed microseconds as a string
    pub fn elapsed_us(&self) -> String {
        self.start.elapsed().as_micros().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
