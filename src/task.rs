// Task record and its persisted JSON shape

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Date format accepted for due dates
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single to-do item
///
/// Field order matters: it is the key order of the serialized blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    /// ISO-8601 UTC with millisecond precision, set once at creation
    pub created_at: String,
    /// `YYYY-MM-DD`, or empty when no due date was given
    #[serde(default)]
    pub due_date: String,
}

impl Task {
    /// Build a fresh, incomplete task
    pub fn new(id: i64, text: impl Into<String>, due_date: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at: format_timestamp(now),
            due_date: due_date.into(),
        }
    }

    /// Parsed due date, if present and well-formed
    pub fn due(&self) -> Option<NaiveDate> {
        if self.due_date.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(&self.due_date, DUE_DATE_FORMAT).ok()
    }

    /// Parsed creation time
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// True when the task is still open and its due date (midnight UTC) lies before `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        match self.due().and_then(|d| d.and_hms_opt(0, 0, 0)) {
            Some(midnight) => midnight.and_utc() < now,
            None => false,
        }
    }
}

/// Format a timestamp the way `createdAt` is stored, e.g. `2025-01-01T09:30:00.000Z`
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
