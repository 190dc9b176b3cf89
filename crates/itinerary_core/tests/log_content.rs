use itinerary_core::{
    flush_logs, init_logging, EditorError, EditorSession, ExportFormat, ExportSettings, LogConfig,
};

const TITLE: &str = "Zephyrine Lighthouse Picnic";
const EDITED_TITLE: &str = "Quillon Tidepool Walk";
const LOCATION: &str = "Marmalade Quay";
const DESCRIPTION: &str = "Bring the brass telescope";

fn read_logs(dir: &std::path::Path) -> String {
    let mut text = String::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_file() {
            text.push_str(&std::fs::read_to_string(&path).unwrap());
        }
    }
    text
}

#[test]
fn session_logs_carry_metadata_but_no_event_text() {
    let log_dir = tempfile::tempdir().unwrap();
    let export_dir = tempfile::tempdir().unwrap();
    init_logging(&LogConfig {
        level: "trace".to_string(),
        log_dir: log_dir.path().to_path_buf(),
        echo_warnings: false,
    })
    .unwrap();

    let mut session = EditorSession::new(&ExportSettings {
        output_dir: export_dir.path().to_path_buf(),
        scale: 1,
    });

    let mut draft = session.begin_add().unwrap();
    draft.title = TITLE.to_string();
    draft.date = "2024-06-12".to_string();
    draft.location = LOCATION.to_string();
    draft.description = DESCRIPTION.to_string();
    let added = session.submit(&draft).unwrap();

    let mut draft = session.begin_edit(added.id).unwrap();
    draft.title = EDITED_TITLE.to_string();
    session.submit(&draft).unwrap();

    let mut draft = session.begin_edit(added.id).unwrap();
    draft.location = String::new();
    assert!(matches!(session.submit(&draft), Err(EditorError::Form(_))));
    session.cancel();

    session.export(ExportFormat::Png).unwrap();
    session.export(ExportFormat::Pdf).unwrap();
    flush_logs();

    let logs = read_logs(log_dir.path());
    assert!(logs.contains("event=form_submit"));
    assert!(logs.contains("status=rejected"));
    assert!(logs.contains("event=export"));
    for text in [TITLE, EDITED_TITLE, LOCATION, DESCRIPTION] {
        assert!(!logs.contains(text), "log leaked `{text}`");
    }
}
