//! Built-in sample trip used to seed a fresh editing session.

use crate::model::event::{EventType, NewEvent};
use chrono::{NaiveDate, NaiveTime};

/// Returns the four-event Paris sample itinerary in display order.
pub fn sample_itinerary() -> Vec<NewEvent> {
    vec![
        entry(
            "Flight to Paris",
            (2024, 6, 10),
            Some((8, 30)),
            "JFK Airport",
            Some("Air France AF123"),
            EventType::Flight,
        ),
        entry(
            "Check-in at Hotel",
            (2024, 6, 10),
            Some((15, 0)),
            "Le Grand Hotel",
            Some("Reservation #12345"),
            EventType::Hotel,
        ),
        entry(
            "Eiffel Tower Visit",
            (2024, 6, 11),
            Some((10, 0)),
            "Eiffel Tower",
            Some("Skip the line tickets"),
            EventType::Activity,
        ),
        entry(
            "Dinner at Le Jules Verne",
            (2024, 6, 11),
            Some((19, 30)),
            "Eiffel Tower, 2nd floor",
            Some("Reservation required"),
            EventType::Food,
        ),
    ]
}

fn entry(
    title: &str,
    (year, month, day): (i32, u32, u32),
    time: Option<(u32, u32)>,
    location: &str,
    description: Option<&str>,
    kind: EventType,
) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        // All literal dates above are valid calendar dates.
        date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
        time: time.and_then(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0)),
        location: location.to_string(),
        description: description.map(str::to_string),
        kind,
    }
}
