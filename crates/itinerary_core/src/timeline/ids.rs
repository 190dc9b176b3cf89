//! Unique-id capability for newly added events.

use crate::model::event::EventId;
use uuid::Uuid;

/// Supplies a fresh identifier for each added event.
pub trait IdGenerator {
    fn next_id(&mut self) -> EventId;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> EventId {
        Uuid::new_v4()
    }
}

/// Deterministic identifiers (`00000000-0000-0000-0000-00000000000N`).
///
/// Used by tests and scripted sessions that need reproducible ids.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> EventId {
        // Skip zero: the nil UUID is not a valid event id.
        self.next += 1;
        Uuid::from_u128(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::{IdGenerator, RandomIds, SequentialIds};

    #[test]
    fn sequential_ids_never_yield_nil() {
        let mut ids = SequentialIds::new();
        let first = ids.next_id();
        let second = ids.next_id();
        assert!(!first.is_nil());
        assert_ne!(first, second);
        assert_eq!(first.as_u128(), 1);
    }

    #[test]
    fn random_ids_are_distinct() {
        let mut ids = RandomIds;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
