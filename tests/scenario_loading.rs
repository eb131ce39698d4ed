use std::io::Write;

use viewsync_engine::host::ViewHost;
use viewsync_engine::sim::SimulatedHost;
use viewsync_engine::{CommandOutcome, SyncCommand, ViewId, ViewKind, ViewSyncApp};

const SCENARIO: &str = r#"{
    "document": { "title": "Clinic.rvt" },
    "views": [
        {
            "id": 7,
            "name": "Level 1",
            "kind": "plan",
            "window": { "left": 0, "top": 0, "right": 800, "bottom": 400 },
            "visible_min": [-10.0, -5.0, 0.0],
            "visible_max": [10.0, 5.0, 0.0],
            "view_range": {
                "top": { "level_elevation": 0.0, "offset": 10.0 },
                "bottom": { "level_elevation": 0.0 }
            }
        },
        {
            "id": 8,
            "name": "North",
            "kind": "section",
            "crop": {
                "origin": [0.0, 20.0, 0.0],
                "basis_x": [-1.0, 0.0, 0.0],
                "basis_y": [0.0, 0.0, 1.0],
                "basis_z": [0.0, 1.0, 0.0]
            },
            "window": { "left": 0, "top": 0, "right": 600, "bottom": 600 },
            "visible_min": [-3.0, -3.0, 0.0],
            "visible_max": [3.0, 3.0, 0.0],
            "far_clip": { "enabled": true, "offset": 40.0 }
        },
        {
            "id": 9,
            "name": "Door Schedule",
            "kind": "schedule",
            "visible_min": [0.0, 0.0, 0.0],
            "visible_max": [1.0, 1.0, 0.0]
        }
    ],
    "active_view": 7
}"#;

fn write_scenario(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write scenario");
    file
}

#[test]
fn loads_views_windows_and_active_view() {
    let file = write_scenario(SCENARIO);
    let host = SimulatedHost::load(file.path()).expect("scenario loads");
    assert_eq!(host.open_views().unwrap(), vec![ViewId(7), ViewId(8)]);
    assert_eq!(host.active_view(), Some(ViewId(7)));
    assert_eq!(host.view_kind(ViewId(9)), Ok(ViewKind::Schedule));
    assert_eq!(host.window_rect(ViewId(9)), Ok(None));
    let document = host.active_document().expect("document");
    assert_eq!((document.title.as_str(), document.is_family), ("Clinic.rvt", false));
}

#[test]
fn loaded_scenario_syncs_section_to_plan() {
    let file = write_scenario(SCENARIO);
    let mut host = SimulatedHost::load(file.path()).expect("scenario loads");
    let mut app = ViewSyncApp::default();
    assert_eq!(app.execute(&mut host, SyncCommand::SyncNow), CommandOutcome::Succeeded);
    assert_eq!(host.zoom_log(), &[ViewId(8)]);

    // Plan box: center (0, 0, 5), 0.0125 per pixel. On the 600 px north section that is local (0, 5), half extent 7.5.
    let section = host.view(ViewId(8)).unwrap();
    let center = section.visible_center();
    assert!(center.x.abs() < 1e-9 && (center.y - 5.0).abs() < 1e-9, "section center {center:?}");
    let (half_w, half_h) = section.visible_half_size();
    assert!((half_w - 7.5).abs() < 1e-9 && (half_h - 7.5).abs() < 1e-9);
}

#[test]
fn invalid_scenarios_report_context() {
    let file = write_scenario(r#"{ "views": [ { "id": 1 } ] }"#);
    let err = SimulatedHost::load(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse scenario file"), "unexpected error: {err:#}");

    let duplicate = write_scenario(
        r#"{ "views": [
            { "id": 1, "kind": "plan", "visible_min": [0, 0, 0], "visible_max": [1, 1, 0] },
            { "id": 1, "kind": "section", "visible_min": [0, 0, 0], "visible_max": [1, 1, 0] }
        ] }"#,
    );
    let err = SimulatedHost::load(duplicate.path()).unwrap_err();
    assert!(format!("{err:#}").contains("Duplicate view id"), "unexpected error: {err:#}");
}

#[test]
fn missing_document_disables_commands() {
    let file = write_scenario(r#"{ "views": [] }"#);
    let mut host = SimulatedHost::load(file.path()).expect("scenario loads");
    let mut app = ViewSyncApp::default();
    assert_eq!(app.execute(&mut host, SyncCommand::SyncNow), CommandOutcome::Cancelled);
}

#[test]
fn bundled_office_scenario_runs() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/office.json");
    let mut host = SimulatedHost::load(&path).expect("bundled scenario loads");
    assert_eq!(host.open_views().unwrap(), vec![ViewId(9), ViewId(11), ViewId(8), ViewId(7)]);

    let mut app = ViewSyncApp::default();
    assert_eq!(app.execute(&mut host, SyncCommand::SyncNow), CommandOutcome::Succeeded);
    assert_eq!(host.zoom_log(), &[ViewId(8), ViewId(11)]);
}
