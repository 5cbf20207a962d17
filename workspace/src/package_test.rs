#![allow(clippy::float_cmp)]

use mapview::coords::PercentPoint;
use time::macros::datetime;

use super::*;

const NOW_MS: i64 = 1_700_000_000_000;

fn exported_state() -> WorkspaceState {
    let mut state = WorkspaceState::new();
    state.set_project_name("Expo Hall 2024!");
    state.set_image(MapImage::new("floor.webp", "image/webp", vec![7, 8, 9]).unwrap());
    state.set_image_size(800, 600);
    state.add_waypoint(PercentPoint::new(12.5, 87.5), "Booth A", "Sales", 1_000);
    state.add_waypoint(PercentPoint::new(50.0, 25.0), "Stage", "", 2_000);
    state
}

fn entries_with_document(json: &str) -> Vec<PackageEntry> {
    vec![PackageEntry::new("map.png", vec![1, 2]), PackageEntry::new(DOCUMENT_ENTRY, json.as_bytes().to_vec())]
}

#[test]
fn extensions_by_mime() {
    assert_eq!(extension_for_mime("image/png"), ".png");
    assert_eq!(extension_for_mime("image/jpeg"), ".jpg");
    assert_eq!(extension_for_mime("IMAGE/GIF"), ".gif");
    assert_eq!(extension_for_mime("image/webp"), ".webp");
    assert_eq!(extension_for_mime("image/svg+xml"), ".svg");
    assert_eq!(extension_for_mime("image/bmp"), ".png");
    assert_eq!(image_entry_name("image/jpeg"), "map.jpg");
}

#[test]
fn archive_name_is_sanitized_and_stamped() {
    let name = archive_file_name("Expo Hall 2024!", datetime!(2024-03-05 14:07:09 UTC)).unwrap();
    assert_eq!(name, "expo_hall_2024__2024-03-05T14-07-09.zip");
}

#[test]
fn export_without_image_fails() {
    assert!(matches!(export_workspace(&WorkspaceState::new(), datetime!(2024-03-05 14:07:09 UTC)), Err(WorkspaceError::NoImage)));
}

#[test]
fn export_writes_image_and_document() {
    let package = export_workspace(&exported_state(), datetime!(2024-03-05 14:07:09 UTC)).unwrap();
    let names: Vec<&str> = package.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["map.webp", DOCUMENT_ENTRY]);
    assert_eq!(package.entries[0].bytes, [7, 8, 9]);
    assert_eq!(package.file_name, "expo_hall_2024__2024-03-05T14-07-09.zip");
    let reparsed = document::parse_document(&String::from_utf8_lossy(&package.entries[1].bytes)).unwrap();
    assert_eq!(reparsed, package.document);
}

#[test]
fn export_then_import_restores_the_workspace() {
    let state = exported_state();
    let package = export_workspace(&state, datetime!(2024-03-05 14:07:09 UTC)).unwrap();
    let snapshot = import_workspace(&package.entries, NOW_MS).unwrap();

    assert_eq!(snapshot.project_name, "Expo Hall 2024!");
    assert_eq!(snapshot.image.filename, "map.webp");
    assert_eq!(snapshot.image.mime, "image/webp");
    assert_eq!((snapshot.image.width, snapshot.image.height), (800, 600));
    assert_eq!(snapshot.image.bytes, [7, 8, 9]);
    let mut expected = state.waypoints().to_vec();
    expected[1].category = document::DEFAULT_IMPORT_CATEGORY.to_owned();
    assert_eq!(snapshot.waypoints, expected);
    let ids = |cats: &[crate::model::Category]| cats.iter().map(|c| (c.id.clone(), c.name.clone(), c.color.clone())).collect::<Vec<_>>();
    assert_eq!(ids(&snapshot.categories), ids(state.categories()));

    let mut restored = WorkspaceState::new();
    restored.load(snapshot);
    assert_eq!(restored.next_sequence(), 3);
}

#[test]
fn import_without_document_fails() {
    let entries = [PackageEntry::new("map.png", vec![1])];
    assert!(matches!(import_workspace(&entries, NOW_MS), Err(WorkspaceError::MissingDocument)));
}

#[test]
fn import_without_named_image_fails() {
    let json = r#"{ "version": "1.0", "metadata": { "imageMetadata": { "filename": "map.jpg", "type": "image/jpeg" } }, "waypoints": [] }"#;
    assert!(matches!(import_workspace(&entries_with_document(json), NOW_MS), Err(WorkspaceError::MissingImage(n)) if n == "map.jpg"));
}

#[test]
fn import_rejects_unsupported_version() {
    let json = r#"{ "version": "2.0", "metadata": { "imageMetadata": { "filename": "map.png" } }, "waypoints": [] }"#;
    assert!(matches!(import_workspace(&entries_with_document(json), NOW_MS), Err(WorkspaceError::UnsupportedVersion(_))));
}

#[test]
fn import_clamps_and_fills_waypoints() {
    let json = r#"{
        "version": "1.0",
        "metadata": { "projectName": "P", "imageMetadata": { "filename": "map.png" } },
        "waypoints": [ { "id": "not valid", "x": 150, "y": -10 } ]
    }"#;
    let snapshot = import_workspace(&entries_with_document(json), NOW_MS).unwrap();
    assert_eq!(snapshot.image.mime, "image/png");
    let wp = &snapshot.waypoints[0];
    assert_eq!((wp.x, wp.y), (100.0, 0.0));
    assert_eq!(wp.id, "wp_1700000000000_1");
    assert_eq!((wp.sequence, wp.timestamp), (1, NOW_MS));
}

#[test]
fn import_rejects_non_image_entries() {
    let json = r#"{ "version": "1.0", "metadata": { "imageMetadata": { "filename": "map.png", "type": "text/plain" } }, "waypoints": [] }"#;
    assert!(matches!(import_workspace(&entries_with_document(json), NOW_MS), Err(WorkspaceError::NotAnImage(_))));
}
