//! Todo domain model.
//!
//! # Responsibility
//! - Define the persisted todo record and the draft accepted by save.
//! - Derive the display status of a todo from its scheduling window.
//!
//! # Invariants
//! - `title` is non-blank for every persisted todo.
//! - `start_time < end_time` whenever both bounds are set.
//! - `created_at` is stamped once and never rewritten by edits.
//!
//! # Wire format
//! Records are stored as camelCase JSON objects. Window bounds are written as
//! epoch milliseconds; older records holding `datetime-local` strings
//! (`2024-05-01T09:30`) are still readable and are interpreted in local time.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Unix epoch milliseconds.
pub type Timestamp = i64;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";
const LOCAL_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Persisted todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_description")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bound")]
    pub start_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_bound")]
    pub end_time: Option<Timestamp>,
    #[serde(default)]
    pub completed: bool,
    /// Records written without a creation stamp sort as the oldest.
    #[serde(default)]
    pub created_at: Timestamp,
}

impl Todo {
    /// Builds a fresh, not-yet-completed record from a validated draft.
    pub(crate) fn from_draft(draft: TodoDraft, created_at: Timestamp) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            start_time: draft.start_time,
            end_time: draft.end_time,
            completed: false,
            created_at,
        }
    }

    /// Overwrites user-editable fields, keeping `created_at` and `completed`.
    pub(crate) fn apply_draft(&mut self, draft: TodoDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.start_time = draft.start_time;
        self.end_time = draft.end_time;
    }

    /// Returns the display status of this todo at `now`.
    pub fn status(&self, now: Timestamp) -> TodoStatus {
        derive_status(self, now)
    }
}

/// User input for creating or editing a todo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

impl TodoDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_start(mut self, start_time: Timestamp) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_end(mut self, end_time: Timestamp) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Trims text fields, then checks title and window invariants.
    ///
    /// A blank description is normalized to `None`.
    ///
    /// # Errors
    /// - `MissingTitle` when the trimmed title is empty.
    /// - `InvalidTimeRange` when both bounds are set and `start >= end`.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start >= end {
                return Err(ValidationError::InvalidTimeRange { start, end });
            }
        }

        let description = self
            .description
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            title,
            description,
            start_time: self.start_time,
            end_time: self.end_time,
        })
    }
}

/// Rejection reasons for a todo draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingTitle,
    InvalidTimeRange { start: Timestamp, end: Timestamp },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "missing title"),
            Self::InvalidTimeRange { start, end } => write!(
                f,
                "invalid time range: end ({end}) must be later than start ({start})"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Mutually exclusive display status of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TodoStatus {
    Completed,
    Overdue,
    Upcoming,
    InProgress,
    Pending,
}

impl TodoStatus {
    /// Stable class name used by the start page stylesheet.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::Upcoming => "upcoming",
            Self::InProgress => "in-progress",
            Self::Pending => "pending",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
            Self::Upcoming => "Not started",
            Self::InProgress => "In progress",
            Self::Pending => "Pending",
        }
    }
}

/// Derives the display status of `todo` at instant `now`.
///
/// First match wins: completed, overdue, upcoming, in-progress, pending.
/// A todo with only a future `end_time` is `Pending`, not `Upcoming`.
pub fn derive_status(todo: &Todo, now: Timestamp) -> TodoStatus {
    if todo.completed {
        return TodoStatus::Completed;
    }
    if todo.end_time.is_some_and(|end| now > end) {
        return TodoStatus::Overdue;
    }
    if todo.start_time.is_some_and(|start| now < start) {
        return TodoStatus::Upcoming;
    }
    if let (Some(start), Some(end)) = (todo.start_time, todo.end_time) {
        if start <= now && now <= end {
            return TodoStatus::InProgress;
        }
    }
    TodoStatus::Pending
}

/// Formats a window bound as local `YYYY-MM-DD HH:MM`, or `None` when the
/// timestamp is outside the representable range.
pub fn format_timestamp(timestamp: Timestamp) -> Option<String> {
    Local
        .timestamp_millis_opt(timestamp)
        .single()
        .map(|value| value.format(DISPLAY_FORMAT).to_string())
}

/// Parses a local date-time as entered in a form (`2024-05-01T09:30` or
/// `2024-05-01 09:30`) or an RFC 3339 string into epoch milliseconds.
pub fn parse_local_datetime(input: &str) -> Option<Timestamp> {
    let trimmed = input.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(value.timestamp_millis());
    }

    LOCAL_INPUT_FORMATS.iter().find_map(|format| {
        let naive = NaiveDateTime::parse_from_str(trimmed, format).ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|value| value.timestamp_millis())
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBound {
    Millis(i64),
    Float(f64),
    Text(String),
}

fn deserialize_bound<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawBound>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawBound::Millis(value)) => Ok(Some(value)),
        Some(RawBound::Float(value)) => Ok(Some(value as i64)),
        Some(RawBound::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawBound::Text(text)) => parse_local_datetime(&text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized time value `{text}`"))),
    }
}

fn deserialize_description<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}
