//! Change notifications emitted by the timeline store.

use crate::model::event::EventId;

/// One applied timeline change, delivered to observers after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineChange {
    Added { id: EventId, index: usize },
    Updated { id: EventId, index: usize },
    Removed { id: EventId, index: usize },
    Moved { id: EventId, from: usize, to: usize },
    LockChanged { locked: bool },
}

/// Re-render hook for views that mirror the timeline.
pub trait TimelineObserver {
    fn timeline_changed(&self, change: &TimelineChange);
}

impl<F> TimelineObserver for F
where
    F: Fn(&TimelineChange),
{
    fn timeline_changed(&self, change: &TimelineChange) {
        self(change)
    }
}
