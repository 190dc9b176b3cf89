//! Drag-to-reorder coordination.
//!
//! # Responsibility
//! - Resolve pointer and keyboard reorder input into one drag completion.
//! - Apply a completed drag as a single timeline move.
//!
//! # Invariants
//! - A locked timeline, a cancelled drop, or a drop onto itself never
//!   mutates the timeline.
//! - The store never sees input modality, only `(active, over)` ids.

use crate::model::event::EventId;
use crate::timeline::store::{MoveOutcome, Timeline, TimelineError};
use log::debug;

/// Minimum pointer travel (px) before a press becomes a drag.
pub const POINTER_ACTIVATION_DISTANCE: f32 = 8.0;

/// Drag completion: the dragged event and the event it was dropped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    pub active: EventId,
    /// `None` when the drag was cancelled or dropped outside any card.
    pub over: Option<EventId>,
}

/// Why a drag completion caused no mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Locked,
    Cancelled,
    SameTarget,
    UnknownEvent(EventId),
}

/// Result of handling one drag completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Moved { from: usize, to: usize },
    Ignored(IgnoreReason),
}

impl DragOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Applies a completed drag to the timeline.
pub fn on_drag_complete(timeline: &mut Timeline, drag: DragEnd) -> DragOutcome {
    let outcome = resolve(timeline, drag);
    debug!(
        "event=drag_complete module=reorder status={} active={}",
        match outcome {
            DragOutcome::Moved { .. } => "ok",
            DragOutcome::Ignored(_) => "skipped",
        },
        drag.active
    );
    outcome
}

fn resolve(timeline: &mut Timeline, drag: DragEnd) -> DragOutcome {
    if timeline.is_locked() {
        return DragOutcome::Ignored(IgnoreReason::Locked);
    }
    let Some(over) = drag.over else {
        return DragOutcome::Ignored(IgnoreReason::Cancelled);
    };
    if over == drag.active {
        return DragOutcome::Ignored(IgnoreReason::SameTarget);
    }

    match timeline.reorder(drag.active, over) {
        Ok(MoveOutcome::Moved { from, to }) => DragOutcome::Moved { from, to },
        Ok(MoveOutcome::Unchanged) => DragOutcome::Ignored(IgnoreReason::SameTarget),
        Err(TimelineError::Locked) => DragOutcome::Ignored(IgnoreReason::Locked),
        Err(TimelineError::EventNotFound(id)) => {
            DragOutcome::Ignored(IgnoreReason::UnknownEvent(id))
        }
        Err(_) => DragOutcome::Ignored(IgnoreReason::Cancelled),
    }
}

/// Reorder input modality that yields a drag completion.
pub trait ReorderSource {
    /// Resolves this input against the current display order.
    ///
    /// Returns `None` when the input never became a drag.
    fn drag_end(&self, order: &[EventId]) -> Option<DragEnd>;
}

/// Continuous pointer gesture over the card list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDrag {
    pub active: EventId,
    pub start: (f32, f32),
    pub end: (f32, f32),
    /// Card under the pointer at release, if any.
    pub over: Option<EventId>,
}

impl PointerDrag {
    /// Euclidean pointer travel between press and release.
    pub fn distance(&self) -> f32 {
        let dx = self.end.0 - self.start.0;
        let dy = self.end.1 - self.start.1;
        (dx * dx + dy * dy).sqrt()
    }
}

impl ReorderSource for PointerDrag {
    fn drag_end(&self, _order: &[EventId]) -> Option<DragEnd> {
        if self.distance() < POINTER_ACTIVATION_DISTANCE {
            return None;
        }
        Some(DragEnd {
            active: self.active,
            over: self.over,
        })
    }
}

/// Direction of one keyboard reorder step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// Discrete keyboard step: move the focused card one slot up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardStep {
    pub active: EventId,
    pub direction: StepDirection,
}

impl ReorderSource for KeyboardStep {
    fn drag_end(&self, order: &[EventId]) -> Option<DragEnd> {
        let index = order.iter().position(|id| *id == self.active)?;
        let over = match self.direction {
            StepDirection::Up => index.checked_sub(1),
            StepDirection::Down => Some(index + 1),
        }
        .and_then(|neighbour| order.get(neighbour).copied());
        Some(DragEnd {
            active: self.active,
            over,
        })
    }
}

/// Resolves `source` against the timeline and applies the resulting drag.
///
/// Input that never became a drag is reported as `Cancelled`.
pub fn apply_source(timeline: &mut Timeline, source: &dyn ReorderSource) -> DragOutcome {
    match source.drag_end(&timeline.ids()) {
        Some(drag) => on_drag_complete(timeline, drag),
        None => DragOutcome::Ignored(IgnoreReason::Cancelled),
    }
}
