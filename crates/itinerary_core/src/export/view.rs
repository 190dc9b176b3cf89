//! Render-ready snapshot of the timeline.
//!
//! Export never reads the live store: it works on a `RenderedTimeline`
//! captured at call time, so later edits do not leak into an export.

use crate::model::event::{Event, EventId, EventType, TIME_FORMAT};
use crate::timeline::store::Timeline;
use chrono::NaiveDate;

/// Long display format, e.g. `Wednesday, June 12, 2024`.
pub const DISPLAY_DATE_FORMAT: &str = "%A, %B %-d, %Y";

/// Text shown in place of cards when the timeline is empty.
pub const EMPTY_TIMELINE_TEXT: &str =
    "No events yet. Add your first event to start planning your trip!";

/// One rendered event card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: EventId,
    pub kind: EventType,
    pub type_label: &'static str,
    pub title: String,
    pub date_label: String,
    pub time_label: Option<String>,
    pub location: String,
    pub description: Option<String>,
}

impl CardView {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id,
            kind: event.kind,
            type_label: event.kind.label(),
            title: event.title.clone(),
            date_label: display_date(event.date),
            time_label: event.time.map(|time| time.format(TIME_FORMAT).to_string()),
            location: event.location.clone(),
            description: event.description.clone(),
        }
    }

    /// Number of detail rows under the title (date, optional time, location).
    pub fn detail_rows(&self) -> u32 {
        if self.time_label.is_some() {
            3
        } else {
            2
        }
    }
}

/// Snapshot of everything the timeline surface displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTimeline {
    pub cards: Vec<CardView>,
    /// Locked timelines hide the per-card edit menu.
    pub locked: bool,
}

impl RenderedTimeline {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Captures the current timeline as a render snapshot.
pub fn render(timeline: &Timeline) -> RenderedTimeline {
    RenderedTimeline {
        cards: timeline.events().iter().map(CardView::from_event).collect(),
        locked: timeline.is_locked(),
    }
}

/// Locale-independent long date label.
pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{display_date, render};
    use crate::model::event::{EventType, NewEvent};
    use crate::timeline::store::Timeline;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn display_date_uses_long_form_without_padding() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert_eq!(display_date(date), "Sunday, June 2, 2024");
    }

    #[test]
    fn render_snapshots_cards_in_order() {
        let mut timeline = Timeline::new();
        timeline
            .add(NewEvent {
                title: "Check-in".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
                time: NaiveTime::from_hms_opt(15, 0, 0),
                location: "Le Grand Hotel".to_string(),
                description: None,
                kind: EventType::Hotel,
            })
            .unwrap();

        let snapshot = render(&timeline);
        timeline.set_locked(true);

        assert_eq!(snapshot.cards.len(), 1);
        assert!(!snapshot.locked);
        let card = &snapshot.cards[0];
        assert_eq!(card.type_label, "Hotel");
        assert_eq!(card.date_label, "Wednesday, June 12, 2024");
        assert_eq!(card.time_label.as_deref(), Some("15:00"));
        assert_eq!(card.detail_rows(), 3);
    }
}
