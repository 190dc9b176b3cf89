//! Core domain logic for the itinerary timeline editor.
//! This crate is the single source of truth for timeline invariants.

pub mod config;
pub mod editor;
pub mod export;
pub mod form;
pub mod logging;
pub mod model;
pub mod reorder;
pub mod timeline;

pub use config::{ConfigError, ConfigOverrides, ConfigWarning, EditorConfig, ExportSettings};
pub use editor::{EditorError, EditorResult, EditorSession, Mode};
pub use export::adapter::ExportAdapter;
pub use export::view::{render, RenderedTimeline};
pub use export::{ExportArtifact, ExportError, ExportFormat};
pub use form::{to_editable, validate, EventDraft, FormError, FormField};
pub use logging::{
    default_log_level, flush_logs, init_logging, logging_status, LogConfig, LoggingError,
};
pub use model::event::{Event, EventId, EventType, NewEvent};
pub use model::sample::sample_itinerary;
pub use reorder::{on_drag_complete, DragEnd, DragOutcome, KeyboardStep, PointerDrag};
pub use timeline::ids::{IdGenerator, RandomIds, SequentialIds};
pub use timeline::store::{MoveOutcome, Timeline, TimelineError, TimelineResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
