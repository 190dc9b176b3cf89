//! Line command parsing and execution against an editor session.
//!
//! # Responsibility
//! - Tokenize one input line into a typed `Command`.
//! - Execute commands through `EditorSession` and render replies as text.
//!
//! # Invariants
//! - Positions are 1-based in every command.
//! - Execution errors are returned as text; they never end the session.

use itinerary_core::export::view::EMPTY_TIMELINE_TEXT;
use itinerary_core::form::parse_field;
use itinerary_core::reorder::{IgnoreReason, StepDirection};
use itinerary_core::{
    DragEnd, DragOutcome, EditorSession, Event, EventDraft, EventId, ExportFormat, FormField,
    KeyboardStep, Mode,
};
use once_cell::sync::Lazy;
use regex::Regex;

// `key=value`, `key="quoted value"` or a bare word.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:([A-Za-z_]+)=)?(?:"((?:[^"\\]|\\.)*)"|(\S+))"#).expect("valid token regex")
});

pub const HELP_TEXT: &str = "\
commands:
  list [--json]                 show the timeline
  add [key=value ...]           open the add form; with values, save at once
  edit <n|id> [key=value ...]   open the edit form; with values, save at once
  set key=value ...             change fields of the open form
  save | cancel                 submit or discard the open form
  delete <n|id>                 remove an event
  move <from> <to>              drag event <from> onto the slot of <to>
  up <n> | down <n>             move an event one slot
  lock | unlock                 toggle editing
  export png|pdf                write travel-timeline.png / .pdf
  help | quit
fields: title, type, date (YYYY-MM-DD), time (HH:MM), location, description
types: flight, hotel, activity, transport, food, other";

/// One `key=value` field assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub field: FormField,
    pub value: String,
}

/// Event reference: 1-based position or event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Position(usize),
    Id(EventId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { json: bool },
    Add(Vec<Assignment>),
    Edit { target: Target, assignments: Vec<Assignment> },
    Set(Vec<Assignment>),
    Save,
    Cancel,
    Delete(Target),
    Move { from: Target, to: Target },
    Step { target: Target, direction: StepDirection },
    Lock,
    Unlock,
    Export(ExportFormat),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    key: Option<&'a str>,
    value: &'a str,
    quoted: bool,
}

fn tokenize(line: &str) -> Vec<Token<'_>> {
    TOKEN_RE
        .captures_iter(line)
        .filter_map(|caps| {
            let key = caps.get(1).map(|m| m.as_str());
            let (value, quoted) = match (caps.get(2), caps.get(3)) {
                (Some(quoted), _) => (quoted.as_str(), true),
                (None, Some(bare)) => (bare.as_str(), false),
                (None, None) => return None,
            };
            Some(Token { key, value, quoted })
        })
        .collect()
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let tokens = tokenize(line);
    let Some((head, args)) = tokens.split_first() else {
        return Ok(None);
    };
    if head.key.is_some() {
        return Err(format!("expected a command, got `{}`", line.trim()));
    }

    let command = match head.value.to_ascii_lowercase().as_str() {
        "list" | "ls" => Command::List {
            json: match args {
                [] => false,
                [flag] if flag.key.is_none() && flag.value == "--json" => true,
                _ => return Err("usage: list [--json]".to_string()),
            },
        },
        "add" | "new" => Command::Add(assignments(args)?),
        "edit" => {
            let (target, rest) = args
                .split_first()
                .ok_or_else(|| "usage: edit <n|id> [key=value ...]".to_string())?;
            Command::Edit {
                target: target_of(target)?,
                assignments: assignments(rest)?,
            }
        }
        "set" => {
            if args.is_empty() {
                return Err("usage: set key=value ...".to_string());
            }
            Command::Set(assignments(args)?)
        }
        "save" | "submit" => Command::Save,
        "cancel" => Command::Cancel,
        "delete" | "rm" => Command::Delete(single_target(args, "delete <n|id>")?),
        "move" | "mv" => match args {
            [from, to] => Command::Move {
                from: target_of(from)?,
                to: target_of(to)?,
            },
            _ => return Err("usage: move <from> <to>".to_string()),
        },
        "up" => Command::Step {
            target: single_target(args, "up <n|id>")?,
            direction: StepDirection::Up,
        },
        "down" => Command::Step {
            target: single_target(args, "down <n|id>")?,
            direction: StepDirection::Down,
        },
        "lock" => Command::Lock,
        "unlock" => Command::Unlock,
        "export" => match args {
            [format] if format.key.is_none() => Command::Export(format.value.parse()?),
            _ => return Err("usage: export png|pdf".to_string()),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(Some(command))
}

fn assignments(tokens: &[Token<'_>]) -> Result<Vec<Assignment>, String> {
    tokens
        .iter()
        .map(|token| {
            let key = token
                .key
                .ok_or_else(|| format!("expected key=value, got `{}`", token.value))?;
            let field = parse_field(key).map_err(|err| err.to_string())?;
            let value = if token.quoted {
                unescape(token.value)
            } else {
                token.value.to_string()
            };
            Ok(Assignment { field, value })
        })
        .collect()
}

fn single_target(tokens: &[Token<'_>], usage: &str) -> Result<Target, String> {
    match tokens {
        [target] => target_of(target),
        _ => Err(format!("usage: {usage}")),
    }
}

fn target_of(token: &Token<'_>) -> Result<Target, String> {
    if token.key.is_some() {
        return Err(format!("expected a position or id, got `{}`", token.value));
    }
    if let Ok(position) = token.value.parse::<usize>() {
        return if position == 0 {
            Err("positions start at 1".to_string())
        } else {
            Ok(Target::Position(position))
        };
    }
    token
        .value
        .parse::<EventId>()
        .map(Target::Id)
        .map_err(|_| format!("`{}` is neither a position nor an event id", token.value))
}

/// Reply to a successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Command interpreter bound to one session and its open draft.
pub struct Shell {
    session: EditorSession,
    draft: Option<EventDraft>,
}

impl Shell {
    pub fn new(session: EditorSession) -> Self {
        Self {
            session,
            draft: None,
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Prompt reflecting lock and form state.
    pub fn prompt(&self) -> &'static str {
        match (self.session.timeline().is_locked(), self.session.mode()) {
            (true, _) => "itinerary[locked]> ",
            (false, Mode::Idle) => "itinerary> ",
            (false, Mode::Adding) => "itinerary[add]> ",
            (false, Mode::Editing(_)) => "itinerary[edit]> ",
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply, String> {
        let text = match command {
            Command::List { json } => self.list(json)?,
            Command::Add(assignments) => {
                let draft = self.session.begin_add().map_err(|err| err.to_string())?;
                self.open_form(draft, assignments)?
            }
            Command::Edit {
                target,
                assignments,
            } => {
                let id = self.resolve(target)?;
                let draft = self.session.begin_edit(id).map_err(|err| err.to_string())?;
                self.open_form(draft, assignments)?
            }
            Command::Set(assignments) => {
                let draft = self.draft.as_mut().ok_or("no form is open")?;
                apply(draft, assignments)?;
                describe_draft(draft)
            }
            Command::Save => self.save()?,
            Command::Cancel => {
                self.session.cancel();
                self.draft = None;
                "form closed".to_string()
            }
            Command::Delete(target) => {
                let id = self.resolve(target)?;
                let removed = self.session.delete(id).map_err(|err| err.to_string())?;
                self.sync_draft();
                format!("deleted `{}`", removed.title)
            }
            Command::Move { from, to } => {
                let drag = DragEnd {
                    active: self.resolve(from)?,
                    over: Some(self.resolve(to)?),
                };
                describe_move(self.session.drag_complete(drag))?
            }
            Command::Step { target, direction } => {
                let step = KeyboardStep {
                    active: self.resolve(target)?,
                    direction,
                };
                describe_move(self.session.apply_reorder(&step))?
            }
            Command::Lock => {
                self.session.set_locked(true);
                self.sync_draft();
                "timeline locked".to_string()
            }
            Command::Unlock => {
                self.session.set_locked(false);
                "timeline unlocked".to_string()
            }
            Command::Export(format) => {
                let path = self.session.export(format).map_err(|err| err.to_string())?;
                format!("exported {}", path.display())
            }
            Command::Help => HELP_TEXT.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    fn list(&self, json: bool) -> Result<String, String> {
        let timeline = self.session.timeline();
        if json {
            return serde_json::to_string_pretty(timeline.events()).map_err(|err| err.to_string());
        }
        if timeline.is_empty() {
            return Ok(EMPTY_TIMELINE_TEXT.to_string());
        }
        let mut lines: Vec<String> = timeline
            .events()
            .iter()
            .enumerate()
            .map(|(index, event)| describe_event(index + 1, event))
            .collect();
        if timeline.is_locked() {
            lines.push("(locked)".to_string());
        }
        Ok(lines.join("\n"))
    }

    fn open_form(
        &mut self,
        mut draft: EventDraft,
        assignments: Vec<Assignment>,
    ) -> Result<String, String> {
        let submit_now = !assignments.is_empty();
        let applied = apply(&mut draft, assignments);
        self.draft = Some(draft);
        applied?;
        if submit_now {
            return self.save();
        }
        Ok(self.draft.as_ref().map(describe_draft).unwrap_or_default())
    }

    fn save(&mut self) -> Result<String, String> {
        let draft = self.draft.as_ref().ok_or("no form is open")?;
        match self.session.submit(draft) {
            Ok(event) => {
                self.draft = None;
                let position = self.session.timeline().position(event.id).unwrap_or(0) + 1;
                Ok(format!("saved {}", describe_event(position, &event)))
            }
            Err(err) => Err(format!("{err} (form still open: use `set`, `save` or `cancel`)")),
        }
    }

    fn resolve(&self, target: Target) -> Result<EventId, String> {
        let timeline = self.session.timeline();
        match target {
            Target::Position(position) => timeline
                .events()
                .get(position - 1)
                .map(|event| event.id)
                .ok_or_else(|| format!("no event at position {position}")),
            Target::Id(id) => timeline
                .get(id)
                .map(|event| event.id)
                .ok_or_else(|| format!("event not found: {id}")),
        }
    }

    /// Drops the local draft when the session closed its form.
    fn sync_draft(&mut self) {
        if self.session.mode() == Mode::Idle {
            self.draft = None;
        }
    }
}

fn apply(draft: &mut EventDraft, assignments: Vec<Assignment>) -> Result<(), String> {
    for Assignment { field, value } in assignments {
        draft.set(field, value).map_err(|err| err.to_string())?;
    }
    Ok(())
}

fn describe_event(position: usize, event: &Event) -> String {
    let when = match event.time_text() {
        Some(time) => format!("{} {time}", event.date_text()),
        None => event.date_text(),
    };
    let mut line = format!(
        "{position}. [{}] {} | {when} | {}",
        event.kind.label(),
        event.title,
        event.location
    );
    if let Some(description) = &event.description {
        line.push_str(&format!(" | {description}"));
    }
    line
}

fn describe_draft(draft: &EventDraft) -> String {
    format!(
        "form: title=\"{}\" type={} date={} time={} location=\"{}\" description=\"{}\"",
        draft.title, draft.kind, draft.date, draft.time, draft.location, draft.description
    )
}

fn describe_move(outcome: DragOutcome) -> Result<String, String> {
    match outcome {
        DragOutcome::Moved { from, to } => Ok(format!("moved {} -> {}", from + 1, to + 1)),
        DragOutcome::Ignored(IgnoreReason::Locked) => Err("timeline is locked".to_string()),
        DragOutcome::Ignored(IgnoreReason::SameTarget) => Ok("nothing to move".to_string()),
        DragOutcome::Ignored(IgnoreReason::Cancelled) => {
            Ok("already at the edge of the timeline".to_string())
        }
        DragOutcome::Ignored(IgnoreReason::UnknownEvent(id)) => {
            Err(format!("event not found: {id}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, Assignment, Command, Reply, Shell, Target};
    use itinerary_core::export::view::EMPTY_TIMELINE_TEXT;
    use itinerary_core::reorder::StepDirection;
    use itinerary_core::{
        sample_itinerary, EditorSession, ExportAdapter, ExportFormat, FormField, Mode,
        SequentialIds, Timeline,
    };
    use std::path::PathBuf;

    fn shell() -> Shell {
        let mut session = EditorSession::with_parts(
            Timeline::with_id_generator(SequentialIds::new()),
            ExportAdapter::default(),
            PathBuf::from("."),
        );
        session.seed(sample_itinerary()).unwrap();
        Shell::new(session)
    }

    fn run(shell: &mut Shell, line: &str) -> Result<String, String> {
        let command = parse_command(line)?.unwrap();
        match shell.execute(command)? {
            Reply::Text(text) => Ok(text),
            Reply::Quit => Ok("quit".to_string()),
        }
    }

    #[test]
    fn parses_quoted_assignments() {
        let command =
            parse_command(r#"add title="Flight to \"Paris\"" date=2024-06-10 type=flight"#)
                .unwrap()
                .unwrap();
        assert_eq!(
            command,
            Command::Add(vec![
                Assignment {
                    field: FormField::Title,
                    value: "Flight to \"Paris\"".to_string(),
                },
                Assignment {
                    field: FormField::Date,
                    value: "2024-06-10".to_string(),
                },
                Assignment {
                    field: FormField::Type,
                    value: "flight".to_string(),
                },
            ])
        );
    }

    #[test]
    fn parses_targets_and_rejects_bad_input() {
        assert_eq!(
            parse_command("down 2").unwrap(),
            Some(Command::Step {
                target: Target::Position(2),
                direction: StepDirection::Down,
            })
        );
        assert_eq!(
            parse_command("export PDF").unwrap(),
            Some(Command::Export(ExportFormat::Pdf))
        );
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("delete 0").is_err());
        assert!(parse_command("add venue=Louvre").is_err());
        assert!(parse_command("teleport 1").is_err());
    }

    #[test]
    fn add_with_values_saves_immediately() {
        let mut shell = shell();
        let reply = run(
            &mut shell,
            r#"add title="Louvre" date=2024-06-12 location="Rue de Rivoli" type=activity"#,
        )
        .unwrap();
        assert!(reply.starts_with("saved 5. [Activity] Louvre"));
        assert_eq!(shell.session().mode(), Mode::Idle);
    }

    #[test]
    fn failed_save_keeps_form_open_for_fixes() {
        let mut shell = shell();
        let err = run(&mut shell, "add date=2024-06-12 location=Y").unwrap_err();
        assert!(err.contains("title"));
        assert_eq!(shell.session().mode(), Mode::Adding);

        run(&mut shell, "set title=X").unwrap();
        let reply = run(&mut shell, "save").unwrap();
        assert!(reply.starts_with("saved 5."));
        assert_eq!(shell.session().timeline().len(), 5);
    }

    #[test]
    fn move_and_lock_follow_session_rules() {
        let mut shell = shell();
        assert_eq!(run(&mut shell, "move 4 1").unwrap(), "moved 4 -> 1");
        assert_eq!(
            shell.session().timeline().events()[0].title,
            "Dinner at Le Jules Verne"
        );

        run(&mut shell, "lock").unwrap();
        assert!(run(&mut shell, "delete 1").is_err());
        assert!(run(&mut shell, "up 2").is_err());
        run(&mut shell, "unlock").unwrap();
        assert!(run(&mut shell, "delete 1").unwrap().contains("Dinner"));
    }

    #[test]
    fn list_json_uses_type_field() {
        let mut shell = shell();
        let json = run(&mut shell, "list --json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[0]["type"], "flight");
    }

    #[test]
    fn list_after_deleting_everything_shows_placeholder() {
        let mut shell = shell();
        for _ in 0..4 {
            run(&mut shell, "delete 1").unwrap();
        }
        assert_eq!(run(&mut shell, "list").unwrap(), EMPTY_TIMELINE_TEXT);
    }
}
