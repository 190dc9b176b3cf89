//! Event form validation for create and edit flows.
//!
//! # Responsibility
//! - Turn raw form text into a typed `NewEvent` candidate.
//! - Map a stored event back into form text for editing.
//!
//! # Invariants
//! - Required fields: title, date, location. Type always has a value.
//! - Blank optional fields (time, description) normalize to `None`.
//! - Dates are read and written as `YYYY-MM-DD`; display formatting lives in
//!   the view layer.

use crate::model::event::{Event, EventType, NewEvent, DATE_FORMAT, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime, Timelike};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Form field identifiers, in on-screen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Type,
    Date,
    Time,
    Location,
    Description,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Type => "type",
            Self::Date => "date",
            Self::Time => "time",
            Self::Location => "location",
            Self::Description => "description",
        }
    }
}

impl Display for FormField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a draft cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A required field is empty or whitespace.
    MissingField(FormField),
    /// Date text is not a `YYYY-MM-DD` calendar date.
    InvalidDate(String),
    /// Time text is not `HH:MM` (or `HH:MM:SS`).
    InvalidTime(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field is empty: {field}"),
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidTime(value) => write!(f, "invalid time `{value}`; expected HH:MM"),
        }
    }
}

impl Error for FormError {}

/// Raw form values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub kind: EventType,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
}

impl EventDraft {
    /// Blank draft for the "add event" form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one field from text input.
    ///
    /// # Errors
    /// - `UnknownFieldValue` when `field` is `Type` and `value` names no type.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) -> Result<(), DraftError> {
        let value = value.into();
        match field {
            FormField::Title => self.title = value,
            FormField::Type => {
                self.kind = value
                    .parse()
                    .map_err(|_| DraftError::UnknownFieldValue { field, value })?;
            }
            FormField::Date => self.date = value,
            FormField::Time => self.time = value,
            FormField::Location => self.location = value,
            FormField::Description => self.description = value,
        }
        Ok(())
    }
}

/// Errors while filling a draft field by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    UnknownField(String),
    UnknownFieldValue { field: FormField, value: String },
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(name) => write!(
                f,
                "unknown field `{name}`; expected title|type|date|time|location|description"
            ),
            Self::UnknownFieldValue { field, value } => {
                write!(f, "unsupported value for {field}: `{value}`")
            }
        }
    }
}

impl Error for DraftError {}

/// Resolves a field from its lowercase name.
pub fn parse_field(name: &str) -> Result<FormField, DraftError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "title" => Ok(FormField::Title),
        "type" | "kind" => Ok(FormField::Type),
        "date" => Ok(FormField::Date),
        "time" => Ok(FormField::Time),
        "location" => Ok(FormField::Location),
        "description" | "desc" => Ok(FormField::Description),
        _ => Err(DraftError::UnknownField(name.trim().to_string())),
    }
}

/// Validates and normalizes a draft into an event candidate.
///
/// Required fields are checked in on-screen order so the first missing one
/// is reported.
///
/// # Errors
/// - `MissingField` for a blank title, date or location.
/// - `InvalidDate` / `InvalidTime` for unparsable text.
pub fn validate(draft: &EventDraft) -> Result<NewEvent, FormError> {
    let title = required(&draft.title, FormField::Title)?;
    let date_text = required(&draft.date, FormField::Date)?;
    let location = required(&draft.location, FormField::Location)?;

    let date = parse_date(date_text)?;
    let time = match optional(&draft.time) {
        Some(text) => Some(parse_time(text)?),
        None => None,
    };

    Ok(NewEvent {
        title: title.to_string(),
        date,
        time,
        location: location.to_string(),
        description: optional(&draft.description).map(str::to_string),
        kind: draft.kind,
    })
}

/// Pre-populates an edit form from a stored event.
pub fn to_editable(event: &Event) -> EventDraft {
    EventDraft {
        title: event.title.clone(),
        kind: event.kind,
        date: event.date.format(DATE_FORMAT).to_string(),
        time: event
            .time
            .map(|time| time.format(TIME_FORMAT).to_string())
            .unwrap_or_default(),
        location: event.location.clone(),
        description: event.description.clone().unwrap_or_default(),
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate, FormError> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| FormError::InvalidDate(trimmed.to_string()))
}

/// Parses an `HH:MM` or `HH:MM:SS` clock time; seconds are dropped.
pub fn parse_time(text: &str) -> Result<NaiveTime, FormError> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
        .and_then(|time| time.with_second(0))
        .ok_or_else(|| FormError::InvalidTime(trimmed.to_string()))
}

fn required(value: &str, field: FormField) -> Result<&str, FormError> {
    optional(value).ok_or(FormError::MissingField(field))
}

fn optional(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
