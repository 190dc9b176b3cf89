use itinerary_core::reorder::StepDirection;
use itinerary_core::{
    sample_itinerary, DragEnd, DragOutcome, EditorError, EditorSession, EventType, ExportAdapter,
    FormError, FormField, KeyboardStep, Mode, PointerDrag, SequentialIds, Timeline,
};
use std::path::PathBuf;

fn session() -> EditorSession {
    let mut session = EditorSession::with_parts(
        Timeline::with_id_generator(SequentialIds::new()),
        ExportAdapter::default(),
        PathBuf::from("."),
    );
    session.seed(sample_itinerary()).unwrap();
    session
}

fn titles(session: &EditorSession) -> Vec<String> {
    session
        .timeline()
        .events()
        .iter()
        .map(|event| event.title.clone())
        .collect()
}

#[test]
fn add_flow_appends_and_closes_form() {
    let mut session = session();
    let mut draft = session.begin_add().unwrap();
    assert_eq!(draft.kind, EventType::Activity);

    draft.title = "  Louvre Museum ".to_string();
    draft.date = "2024-06-12".to_string();
    draft.time = "09:00".to_string();
    draft.location = "Rue de Rivoli".to_string();
    let added = session.submit(&draft).unwrap();

    assert_eq!(session.mode(), Mode::Idle);
    assert_eq!(added.title, "Louvre Museum");
    assert_eq!(added.description, None);
    assert_eq!(added.time_text().as_deref(), Some("09:00"));
    assert_eq!(session.timeline().events().last().unwrap().id, added.id);
}

#[test]
fn empty_title_submit_leaves_store_unchanged() {
    let mut session = session();
    let before = session.timeline().events().to_vec();

    let mut draft = session.begin_add().unwrap();
    draft.title = "   ".to_string();
    draft.date = "2024-06-12".to_string();
    draft.location = "Y".to_string();

    let err = session.submit(&draft).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Form(FormError::MissingField(FormField::Title))
    ));
    assert_eq!(session.mode(), Mode::Adding);
    assert_eq!(session.timeline().events(), before.as_slice());
}

#[test]
fn edit_flow_prefills_and_updates_in_place() {
    let mut session = session();
    let target = session.timeline().events()[1].clone();

    let mut draft = session.begin_edit(target.id).unwrap();
    assert_eq!(draft.title, "Check-in at Hotel");
    assert_eq!(draft.date, "2024-06-10");
    assert_eq!(draft.time, "15:00");
    assert_eq!(draft.kind, EventType::Hotel);

    draft.title = "Late check-in".to_string();
    draft.time = String::new();
    let updated = session.submit(&draft).unwrap();

    assert_eq!(updated.id, target.id);
    assert_eq!(updated.time, None);
    assert_eq!(session.timeline().position(target.id), Some(1));
    assert_eq!(session.timeline().len(), 4);
}

#[test]
fn lock_blocks_delete_until_unlocked() {
    let mut session = session();
    let first = session.timeline().events()[0].id;

    session.set_locked(true);
    assert!(matches!(session.delete(first), Err(EditorError::Locked)));
    assert_eq!(session.timeline().len(), 4);

    session.set_locked(false);
    session.delete(first).unwrap();
    assert_eq!(session.timeline().len(), 3);
}

#[test]
fn drag_and_keyboard_reorder_share_one_move_path() {
    let mut session = session();
    let ids = session.timeline().ids();

    let outcome = session.drag_complete(DragEnd {
        active: ids[3],
        over: Some(ids[0]),
    });
    assert_eq!(outcome, DragOutcome::Moved { from: 3, to: 0 });
    assert_eq!(titles(&session)[0], "Dinner at Le Jules Verne");

    let outcome = session.apply_reorder(&KeyboardStep {
        active: ids[3],
        direction: StepDirection::Down,
    });
    assert_eq!(outcome, DragOutcome::Moved { from: 0, to: 1 });
    assert_eq!(titles(&session)[1], "Dinner at Le Jules Verne");
}

#[test]
fn short_pointer_travel_and_locked_drags_do_nothing() {
    let mut session = session();
    let ids = session.timeline().ids();

    let click = PointerDrag {
        active: ids[0],
        start: (10.0, 10.0),
        end: (13.0, 14.0),
        over: Some(ids[2]),
    };
    assert!(!session.apply_reorder(&click).is_moved());
    assert_eq!(session.timeline().ids(), ids);

    session.set_locked(true);
    let outcome = session.drag_complete(DragEnd {
        active: ids[0],
        over: Some(ids[2]),
    });
    assert!(!outcome.is_moved());
    assert_eq!(session.timeline().ids(), ids);
}
