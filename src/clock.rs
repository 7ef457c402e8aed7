//! Time source and task id generation.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::sync::Mutex;

/// Clock provides the current time, so tests can pin it
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Issues strictly increasing creation instants.
///
/// Task ids are the ISO-8601 form of these instants, so two tasks created in
/// the same millisecond still get distinct, chronologically sortable ids.
#[derive(Debug, Default)]
pub struct IdSource {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next instant at millisecond precision, later than every one issued before
    pub fn next(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let now = truncate_to_millis(now);
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        let issued = match *last {
            Some(prev) if now <= prev => prev + Duration::milliseconds(1),
            _ => now,
        };
        *last = Some(issued);
        issued
    }

    /// Record an instant issued earlier (e.g. by a previous run); later ids
    /// will come after it even if the clock has since stepped back
    pub fn observe(&self, instant: DateTime<Utc>) {
        let instant = truncate_to_millis(instant);
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        match *last {
            Some(prev) if prev >= instant => {}
            _ => *last = Some(instant),
        }
    }
}

/// Inverse of [`format_id`]; `None` for ids not issued by an [`IdSource`]
pub fn parse_id(id: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(id)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

/// `2024-03-01T09:30:00.000Z`
pub fn format_id(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn truncate_to_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(instant)
}
