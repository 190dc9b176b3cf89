//! Itinerary event domain model.
//!
//! # Responsibility
//! - Define the canonical record rendered as one timeline card.
//! - Keep the calendar date as a typed value; text forms are derived.
//!
//! # Invariants
//! - `id` is stable and never reused for another event.
//! - `title` and `location` are never blank for a stored event.
//! - `date` serializes as `YYYY-MM-DD`, `time` as `HH:MM`.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of one itinerary event.
pub type EventId = Uuid;

/// Canonical text format of a stored calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical text format of a stored clock time.
pub const TIME_FORMAT: &str = "%H:%M";

/// Fixed event category set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Flight,
    Hotel,
    /// Preselected category of a fresh form.
    #[default]
    Activity,
    Transport,
    Food,
    Other,
}

impl EventType {
    /// All categories in menu order.
    pub const ALL: [EventType; 6] = [
        Self::Flight,
        Self::Hotel,
        Self::Activity,
        Self::Transport,
        Self::Food,
        Self::Other,
    ];

    /// Stable lowercase name used in serialized data and command input.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Hotel => "hotel",
            Self::Activity => "activity",
            Self::Transport => "transport",
            Self::Food => "food",
            Self::Other => "other",
        }
    }

    /// User-facing badge label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Flight => "Flight",
            Self::Hotel => "Hotel",
            Self::Activity => "Activity",
            Self::Transport => "Transport",
            Self::Food => "Food",
            Self::Other => "Other",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text does not name a known event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventType(pub String);

impl Display for UnknownEventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown event type `{}`; expected flight|hotel|activity|transport|food|other",
            self.0
        )
    }
}

impl Error for UnknownEventType {}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownEventType(value.trim().to_string()))
    }
}

/// Event candidate without identity, produced by form validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    #[serde(default, with = "optional_clock_time")]
    pub time: Option<NaiveTime>,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventType,
}

impl NewEvent {
    /// Attaches a stable identity to this candidate.
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            title: self.title,
            date: self.date,
            time: self.time,
            location: self.location,
            description: self.description,
            kind: self.kind,
        }
    }

    /// Checks text invariants shared with stored events.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        validate_text_fields(&self.title, &self.location)
    }
}

/// Canonical itinerary event rendered as one timeline card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Stable identity; survives edits and reorders.
    pub id: EventId,
    pub title: String,
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Optional clock time, serialized as `HH:MM`.
    #[serde(default, with = "optional_clock_time")]
    pub time: Option<NaiveTime>,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: EventType,
}

impl Event {
    /// Splits identity from content, e.g. to re-run form validation.
    pub fn without_id(&self) -> NewEvent {
        NewEvent {
            title: self.title.clone(),
            date: self.date,
            time: self.time,
            location: self.location.clone(),
            description: self.description.clone(),
            kind: self.kind,
        }
    }

    /// Canonical `YYYY-MM-DD` text of `date`.
    pub fn date_text(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Canonical `HH:MM` text of `time`, if set.
    pub fn time_text(&self) -> Option<String> {
        self.time.map(|time| time.format(TIME_FORMAT).to_string())
    }

    /// Validates record invariants before it enters the timeline.
    ///
    /// # Errors
    /// - `NilId` when `id` is the nil UUID.
    /// - `BlankTitle` / `BlankLocation` when required text is blank.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.id.is_nil() {
            return Err(EventValidationError::NilId);
        }
        validate_text_fields(&self.title, &self.location)
    }
}

/// Record-level invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventValidationError {
    NilId,
    BlankTitle,
    BlankLocation,
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "event id must not be nil"),
            Self::BlankTitle => write!(f, "event title must not be blank"),
            Self::BlankLocation => write!(f, "event location must not be blank"),
        }
    }
}

impl Error for EventValidationError {}

fn validate_text_fields(title: &str, location: &str) -> Result<(), EventValidationError> {
    if title.trim().is_empty() {
        return Err(EventValidationError::BlankTitle);
    }
    if location.trim().is_empty() {
        return Err(EventValidationError::BlankLocation);
    }
    Ok(())
}

/// `HH:MM` serde representation for optional clock times.
mod optional_clock_time {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format(TIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveTime::parse_from_str(text, TIME_FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, EventType, EventValidationError, NewEvent};
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    fn sample() -> NewEvent {
        NewEvent {
            title: "Flight to Paris".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            time: NaiveTime::from_hms_opt(8, 30, 0),
            location: "JFK Airport".to_string(),
            description: Some("Air France AF123".to_string()),
            kind: EventType::Flight,
        }
    }

    #[test]
    fn event_type_parses_case_insensitively() {
        assert_eq!(" Hotel ".parse::<EventType>().unwrap(), EventType::Hotel);
        assert_eq!("FOOD".parse::<EventType>().unwrap(), EventType::Food);
        assert!("boat".parse::<EventType>().is_err());
    }

    #[test]
    fn default_event_type_is_activity() {
        assert_eq!(EventType::default(), EventType::Activity);
    }

    #[test]
    fn into_event_keeps_content_and_assigns_id() {
        let id = Uuid::new_v4();
        let event = sample().into_event(id);
        assert_eq!(event.id, id);
        assert_eq!(event.date_text(), "2024-06-10");
        assert_eq!(event.time_text().as_deref(), Some("08:30"));
        assert_eq!(event.without_id(), sample());
    }

    #[test]
    fn validate_rejects_nil_id_and_blank_text() {
        let mut event = sample().into_event(Uuid::nil());
        assert_eq!(event.validate(), Err(EventValidationError::NilId));

        event.id = Uuid::new_v4();
        event.location = "  ".to_string();
        assert_eq!(event.validate(), Err(EventValidationError::BlankLocation));

        event.title.clear();
        assert_eq!(event.validate(), Err(EventValidationError::BlankTitle));
    }

    #[test]
    fn serialization_uses_wire_field_names() {
        let event: Event = sample().into_event(Uuid::new_v4());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "flight");
        assert_eq!(json["date"], "2024-06-10");
        assert_eq!(json["time"], "08:30");

        let decoded: Event = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }
}
