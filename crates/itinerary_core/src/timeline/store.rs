//! Timeline store contracts and in-memory implementation.

use crate::model::event::{Event, EventId, EventValidationError, NewEvent};
use crate::timeline::ids::{IdGenerator, RandomIds};
use crate::timeline::observer::{TimelineChange, TimelineObserver};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

const MAX_ID_ATTEMPTS: usize = 8;

pub type TimelineResult<T> = Result<T, TimelineError>;

/// Errors from timeline mutations. The sequence is unchanged on every error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// The timeline is locked against edits.
    Locked,
    /// No event with this id is in the sequence.
    EventNotFound(EventId),
    /// Record failed invariant checks.
    Invalid(EventValidationError),
    /// The id generator kept returning ids that are already taken.
    IdCollision(EventId),
}

impl Display for TimelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => write!(f, "timeline is locked"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::IdCollision(id) => write!(f, "id generator returned a duplicate id: {id}"),
        }
    }
}

impl Error for TimelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventValidationError> for TimelineError {
    fn from(value: EventValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Result of a successful `reorder` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Element moved from one index to another.
    Moved { from: usize, to: usize },
    /// Source and target are the same element.
    Unchanged,
}

/// Ordered, lockable event sequence owned by one editing session.
pub struct Timeline {
    events: Vec<Event>,
    locked: bool,
    ids: Box<dyn IdGenerator>,
    observers: Vec<Box<dyn TimelineObserver>>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Timeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("events", &self.events)
            .field("locked", &self.locked)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Timeline {
    /// Creates an empty, unlocked timeline with random UUID ids.
    pub fn new() -> Self {
        Self::with_id_generator(RandomIds)
    }

    /// Creates an empty, unlocked timeline with a caller-provided id source.
    pub fn with_id_generator(ids: impl IdGenerator + 'static) -> Self {
        Self {
            events: Vec::new(),
            locked: false,
            ids: Box::new(ids),
            observers: Vec::new(),
        }
    }

    /// Registers a change observer.
    pub fn subscribe(&mut self, observer: impl TimelineObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn ids(&self) -> Vec<EventId> {
        self.events.iter().map(|event| event.id).collect()
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Zero-based index of `id` in display order.
    pub fn position(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|event| event.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Appends a new event with a fresh id and returns the stored record.
    ///
    /// # Errors
    /// - `Locked` when the timeline is locked.
    /// - `Invalid` when the candidate has blank required text.
    /// - `IdCollision` when the id source cannot produce an unused id.
    pub fn add(&mut self, candidate: NewEvent) -> TimelineResult<Event> {
        self.ensure_unlocked("add")?;
        candidate.validate()?;

        let id = self.fresh_id()?;
        let event = candidate.into_event(id);
        self.events.push(event.clone());
        let index = self.events.len() - 1;

        info!(
            "event=timeline_add module=timeline status=ok id={} index={} len={}",
            id,
            index,
            self.events.len()
        );
        self.notify(TimelineChange::Added { id, index });
        Ok(event)
    }

    /// Replaces the stored event sharing `event.id`; position is unchanged.
    ///
    /// # Errors
    /// - `Locked` when the timeline is locked.
    /// - `Invalid` when the record fails validation.
    /// - `EventNotFound` when no event has this id.
    pub fn update(&mut self, event: Event) -> TimelineResult<()> {
        self.ensure_unlocked("update")?;
        event.validate()?;

        let id = event.id;
        let index = self.require_position(id, "update")?;
        self.events[index] = event;

        info!("event=timeline_update module=timeline status=ok id={id} index={index}");
        self.notify(TimelineChange::Updated { id, index });
        Ok(())
    }

    /// Removes the event with `id` and returns it.
    ///
    /// # Errors
    /// - `Locked` when the timeline is locked.
    /// - `EventNotFound` when no event has this id.
    pub fn remove(&mut self, id: EventId) -> TimelineResult<Event> {
        self.ensure_unlocked("remove")?;
        let index = self.require_position(id, "remove")?;
        let removed = self.events.remove(index);

        info!(
            "event=timeline_remove module=timeline status=ok id={} index={} len={}",
            id,
            index,
            self.events.len()
        );
        self.notify(TimelineChange::Removed { id, index });
        Ok(removed)
    }

    /// Moves `from_id` to the index currently held by `to_id`.
    ///
    /// Uses a single-element list move (remove at source, insert at
    /// destination), so untouched elements keep their relative order in both
    /// directions.
    ///
    /// # Errors
    /// - `Locked` when the timeline is locked.
    /// - `EventNotFound` when either id is absent.
    pub fn reorder(&mut self, from_id: EventId, to_id: EventId) -> TimelineResult<MoveOutcome> {
        self.ensure_unlocked("reorder")?;
        let from = self.require_position(from_id, "reorder")?;
        let to = self.require_position(to_id, "reorder")?;
        if from == to {
            return Ok(MoveOutcome::Unchanged);
        }

        let moved = self.events.remove(from);
        self.events.insert(to, moved);

        info!("event=timeline_reorder module=timeline status=ok id={from_id} from={from} to={to}");
        self.notify(TimelineChange::Moved {
            id: from_id,
            from,
            to,
        });
        Ok(MoveOutcome::Moved { from, to })
    }

    /// Sets the lock flag. Never changes the sequence.
    pub fn set_locked(&mut self, locked: bool) {
        if self.locked == locked {
            return;
        }
        self.locked = locked;
        info!("event=timeline_lock module=timeline status=ok locked={locked}");
        self.notify(TimelineChange::LockChanged { locked });
    }

    fn ensure_unlocked(&self, operation: &str) -> TimelineResult<()> {
        if self.locked {
            debug!("event=timeline_{operation} module=timeline status=skipped reason=locked");
            return Err(TimelineError::Locked);
        }
        Ok(())
    }

    fn require_position(&self, id: EventId, operation: &str) -> TimelineResult<usize> {
        self.position(id).ok_or_else(|| {
            debug!("event=timeline_{operation} module=timeline status=skipped reason=not_found id={id}");
            TimelineError::EventNotFound(id)
        })
    }

    fn fresh_id(&mut self) -> TimelineResult<EventId> {
        let mut candidate = EventId::nil();
        for _ in 0..MAX_ID_ATTEMPTS {
            candidate = self.ids.next_id();
            if !candidate.is_nil() && self.position(candidate).is_none() {
                return Ok(candidate);
            }
        }
        warn!("event=timeline_add module=timeline status=error reason=id_collision id={candidate}");
        Err(TimelineError::IdCollision(candidate))
    }

    fn notify(&self, change: TimelineChange) {
        for observer in &self.observers {
            observer.timeline_changed(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MoveOutcome, Timeline, TimelineError};
    use crate::model::event::{EventType, NewEvent};
    use crate::timeline::ids::{IdGenerator, SequentialIds};
    use crate::timeline::observer::TimelineChange;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    fn candidate(title: &str) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            time: None,
            location: "Paris".to_string(),
            description: None,
            kind: EventType::Other,
        }
    }

    struct StuckIds;

    impl IdGenerator for StuckIds {
        fn next_id(&mut self) -> Uuid {
            Uuid::from_u128(7)
        }
    }

    #[test]
    fn add_appends_and_notifies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut timeline = Timeline::with_id_generator(SequentialIds::new());
        timeline.subscribe(move |change: &TimelineChange| sink.borrow_mut().push(*change));

        let first = timeline.add(candidate("A")).unwrap();
        let second = timeline.add(candidate("B")).unwrap();

        assert_eq!(timeline.ids(), vec![first.id, second.id]);
        assert_eq!(
            seen.borrow().as_slice(),
            &[
                TimelineChange::Added {
                    id: first.id,
                    index: 0
                },
                TimelineChange::Added {
                    id: second.id,
                    index: 1
                },
            ]
        );
    }

    #[test]
    fn add_rejects_blank_candidate() {
        let mut timeline = Timeline::new();
        let err = timeline.add(candidate("  ")).unwrap_err();
        assert!(matches!(err, TimelineError::Invalid(_)));
        assert!(timeline.is_empty());
    }

    #[test]
    fn add_retries_taken_ids_then_reports_collision() {
        let mut timeline = Timeline::with_id_generator(StuckIds);
        timeline.add(candidate("A")).unwrap();
        let err = timeline.add(candidate("B")).unwrap_err();
        assert_eq!(err, TimelineError::IdCollision(Uuid::from_u128(7)));
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn reorder_same_id_is_unchanged_and_silent() {
        let seen = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&seen);
        let mut timeline = Timeline::new();
        let a = timeline.add(candidate("A")).unwrap();
        timeline.subscribe(move |_: &TimelineChange| *sink.borrow_mut() += 1);

        assert_eq!(timeline.reorder(a.id, a.id).unwrap(), MoveOutcome::Unchanged);
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn set_locked_only_notifies_on_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut timeline = Timeline::new();
        timeline.subscribe(move |change: &TimelineChange| sink.borrow_mut().push(*change));

        timeline.set_locked(true);
        timeline.set_locked(true);
        timeline.set_locked(false);

        assert_eq!(
            seen.borrow().as_slice(),
            &[
                TimelineChange::LockChanged { locked: true },
                TimelineChange::LockChanged { locked: false },
            ]
        );
    }
}
