//! Editing session use-cases.
//!
//! # Responsibility
//! - Own the timeline and export wiring for one editing session.
//! - Drive the form mode machine: `Idle`, `Adding`, `Editing(id)`.
//!
//! # Invariants
//! - At most one form is open at a time.
//! - No form opens while the timeline is locked; locking closes an open form.
//! - A rejected submit keeps the form open and the timeline unchanged.
//! - Export reads a snapshot and never mutates the timeline.

use crate::config::ExportSettings;
use crate::export::adapter::ExportAdapter;
use crate::export::view::{render, RenderedTimeline};
use crate::export::{ExportArtifact, ExportError, ExportFormat};
use crate::form::{to_editable, validate, EventDraft, FormError};
use crate::model::event::{Event, EventId, NewEvent};
use crate::reorder::{apply_source, on_drag_complete, DragEnd, DragOutcome, ReorderSource};
use crate::timeline::store::{Timeline, TimelineError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type EditorResult<T> = Result<T, EditorError>;

/// Which form, if any, is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Adding,
    Editing(EventId),
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Adding => "adding",
            Self::Editing(_) => "editing",
        }
    }
}

/// Session-level errors.
#[derive(Debug)]
pub enum EditorError {
    /// The timeline is locked against edits.
    Locked,
    /// Another form is already open.
    FormOpen,
    /// `submit` was called with no open form.
    NoOpenForm,
    EventNotFound(EventId),
    Form(FormError),
    Timeline(TimelineError),
    Export(ExportError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => write!(f, "timeline is locked; unlock it to make changes"),
            Self::FormOpen => write!(f, "a form is already open; save or cancel it first"),
            Self::NoOpenForm => write!(f, "no form is open"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Form(err) => write!(f, "{err}"),
            Self::Timeline(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "export failed: {err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Form(err) => Some(err),
            Self::Timeline(err) => Some(err),
            Self::Export(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormError> for EditorError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

impl From<TimelineError> for EditorError {
    fn from(value: TimelineError) -> Self {
        match value {
            TimelineError::Locked => Self::Locked,
            TimelineError::EventNotFound(id) => Self::EventNotFound(id),
            other => Self::Timeline(other),
        }
    }
}

impl From<ExportError> for EditorError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Explicitly owned state of one editing session.
pub struct EditorSession {
    timeline: Timeline,
    exporter: ExportAdapter,
    export_dir: PathBuf,
    mode: Mode,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&ExportSettings::default())
    }
}

impl EditorSession {
    /// Creates an empty session exporting with the built-in backends.
    pub fn new(settings: &ExportSettings) -> Self {
        Self::with_parts(
            Timeline::new(),
            ExportAdapter::new(settings.raster_options()),
            settings.output_dir.clone(),
        )
    }

    /// Creates a session over caller-provided parts.
    pub fn with_parts(timeline: Timeline, exporter: ExportAdapter, export_dir: PathBuf) -> Self {
        Self {
            timeline,
            exporter,
            export_dir,
            mode: Mode::Idle,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_form_open(&self) -> bool {
        self.mode != Mode::Idle
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Appends every candidate in order and returns how many were added.
    ///
    /// # Errors
    /// - `Locked` when the timeline is locked; nothing is added.
    pub fn seed(&mut self, events: Vec<NewEvent>) -> EditorResult<usize> {
        self.ensure_unlocked()?;
        let mut added = 0;
        for candidate in events {
            self.timeline.add(candidate)?;
            added += 1;
        }
        info!("event=session_seed module=editor status=ok count={added}");
        Ok(added)
    }

    /// Opens the blank "add event" form.
    ///
    /// # Errors
    /// - `Locked` / `FormOpen` when the form cannot open.
    pub fn begin_add(&mut self) -> EditorResult<EventDraft> {
        self.ensure_can_open()?;
        self.mode = Mode::Adding;
        debug!("event=form_open module=editor status=ok mode=adding");
        Ok(EventDraft::new())
    }

    /// Opens the edit form pre-populated from the stored event.
    ///
    /// # Errors
    /// - `Locked` / `FormOpen` when the form cannot open.
    /// - `EventNotFound` when `id` is not on the timeline.
    pub fn begin_edit(&mut self, id: EventId) -> EditorResult<EventDraft> {
        self.ensure_can_open()?;
        let event = self.timeline.get(id).ok_or(EditorError::EventNotFound(id))?;
        let draft = to_editable(event);
        self.mode = Mode::Editing(id);
        debug!("event=form_open module=editor status=ok mode=editing id={id}");
        Ok(draft)
    }

    /// Closes the open form without changes.
    pub fn cancel(&mut self) {
        if self.mode != Mode::Idle {
            debug!(
                "event=form_cancel module=editor status=ok mode={}",
                self.mode.as_str()
            );
        }
        self.mode = Mode::Idle;
    }

    /// Validates the draft and commits it for the open form.
    ///
    /// # Contract
    /// - `Adding`: appends a new event.
    /// - `Editing(id)`: replaces the event in place, keeping its id.
    /// - On success the form closes; on any error it stays open.
    ///
    /// # Errors
    /// - `NoOpenForm` in `Idle`.
    /// - `Form` when the draft fails validation.
    /// - `Locked` / `EventNotFound` / `Timeline` from the store.
    pub fn submit(&mut self, draft: &EventDraft) -> EditorResult<Event> {
        let mode = self.mode;
        let result = self.commit(mode, draft);
        match &result {
            Ok(event) => {
                self.mode = Mode::Idle;
                info!(
                    "event=form_submit module=editor status=ok mode={} id={}",
                    mode.as_str(),
                    event.id
                );
            }
            Err(err) => warn!(
                "event=form_submit module=editor status=rejected mode={} error={}",
                mode.as_str(),
                error_kind(err)
            ),
        }
        result
    }

    fn commit(&mut self, mode: Mode, draft: &EventDraft) -> EditorResult<Event> {
        match mode {
            Mode::Idle => Err(EditorError::NoOpenForm),
            Mode::Adding => {
                let candidate = validate(draft)?;
                Ok(self.timeline.add(candidate)?)
            }
            Mode::Editing(id) => {
                let event = validate(draft)?.into_event(id);
                self.timeline.update(event.clone())?;
                Ok(event)
            }
        }
    }

    /// Removes an event. Closes the edit form if it was editing that event.
    ///
    /// # Errors
    /// - `Locked` / `EventNotFound` from the store.
    pub fn delete(&mut self, id: EventId) -> EditorResult<Event> {
        let removed = self.timeline.remove(id)?;
        if self.mode == Mode::Editing(id) {
            self.mode = Mode::Idle;
        }
        Ok(removed)
    }

    /// Applies a completed drag.
    pub fn drag_complete(&mut self, drag: DragEnd) -> DragOutcome {
        on_drag_complete(&mut self.timeline, drag)
    }

    /// Resolves and applies reorder input from any modality.
    pub fn apply_reorder(&mut self, source: &dyn ReorderSource) -> DragOutcome {
        apply_source(&mut self.timeline, source)
    }

    /// Sets the lock flag. Locking closes any open form.
    pub fn set_locked(&mut self, locked: bool) {
        if locked && self.mode != Mode::Idle {
            debug!(
                "event=form_close module=editor status=ok reason=locked mode={}",
                self.mode.as_str()
            );
            self.mode = Mode::Idle;
        }
        self.timeline.set_locked(locked);
    }

    /// Flips the lock flag and returns the new value.
    pub fn toggle_lock(&mut self) -> bool {
        let locked = !self.timeline.is_locked();
        self.set_locked(locked);
        locked
    }

    /// Captures what the timeline currently shows.
    pub fn render(&self) -> RenderedTimeline {
        render(&self.timeline)
    }

    /// Exports the current snapshot without saving it.
    ///
    /// # Errors
    /// - `Export` for any rasterization or encoding failure.
    pub fn export_artifact(&self, format: ExportFormat) -> EditorResult<ExportArtifact> {
        let snapshot = self.render();
        Ok(self.exporter.export(format, Some(&snapshot))?)
    }

    /// Exports the current snapshot and saves it under the export directory.
    ///
    /// # Errors
    /// - `Export` for any rasterization, encoding or write failure.
    pub fn export(&self, format: ExportFormat) -> EditorResult<PathBuf> {
        let artifact = self.export_artifact(format)?;
        let path = artifact.save(&self.export_dir)?;
        info!(
            "event=export_save module=editor status=ok format={} bytes={}",
            format,
            artifact.bytes.len()
        );
        Ok(path)
    }

    fn ensure_unlocked(&self) -> EditorResult<()> {
        if self.timeline.is_locked() {
            return Err(EditorError::Locked);
        }
        Ok(())
    }

    fn ensure_can_open(&self) -> EditorResult<()> {
        self.ensure_unlocked()?;
        if self.mode != Mode::Idle {
            return Err(EditorError::FormOpen);
        }
        Ok(())
    }
}

fn error_kind(err: &EditorError) -> &'static str {
    match err {
        EditorError::Locked => "locked",
        EditorError::FormOpen => "form_open",
        EditorError::NoOpenForm => "no_open_form",
        EditorError::EventNotFound(_) => "not_found",
        EditorError::Form(_) => "validation",
        EditorError::Timeline(_) => "timeline",
        EditorError::Export(_) => "export",
    }
}
