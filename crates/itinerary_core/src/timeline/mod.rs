//! Ordered event store for one editing session.
//!
//! # Responsibility
//! - Own the ordered event sequence and the lock flag.
//! - Apply add/update/remove/reorder with typed outcomes.
//! - Notify registered observers after every applied change.
//!
//! # Invariants
//! - Event ids are unique within the sequence.
//! - Order is user-controlled: add appends, update keeps position, remove
//!   closes the gap, only `reorder` moves elements.
//! - A failed or locked mutation leaves the sequence untouched.

pub mod ids;
pub mod observer;
pub mod store;
