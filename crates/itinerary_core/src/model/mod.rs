//! Itinerary domain model.
//!
//! # Responsibility
//! - Define the event record shared by the store, forms and rendering.
//!
//! # Invariants
//! - Every event is identified by a stable `EventId`.
//! - Deletion removes the record; there are no tombstones.

pub mod event;
pub mod sample;
