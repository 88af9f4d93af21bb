//! Opening and saving YAML documents

use paramsync::host::{Container, Document, MemoryDocument, ObjectKind, Sheet};
use paramsync::SyncError;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn test_data_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("test-data");
    path.push(filename);
    path
}

#[test]
fn test_open_missing_file() {
    let err = MemoryDocument::open(&test_data_path("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
    assert!(err.to_string().contains("Couldn't find"));
}

#[test]
fn test_open_wrong_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("part.FCStd");
    fs::write(&path, "objects: []\n").unwrap();

    let err = MemoryDocument::open(&path).unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
}

#[test]
fn test_open_malformed_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "objects: [\n  - name: {").unwrap();

    let err = MemoryDocument::open(&path).unwrap_err();
    assert!(matches!(err, SyncError::Yaml(_)));
}

#[test]
fn test_open_fixture_objects() {
    let doc = MemoryDocument::open(&test_data_path("part.yaml")).unwrap();

    let sheets = doc.objects_of(ObjectKind::Sheet);
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].identifier, "Spreadsheet");

    let sets = doc.objects_of(ObjectKind::VarSet);
    let labels: Vec<_> = sets.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Panel", "Uncategorised"]);
    assert_eq!(doc.path(), Some(test_data_path("part.yaml").as_path()));
}

#[test]
fn test_save_writes_back_to_opened_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("part.yml");
    fs::copy(test_data_path("part.yaml"), &path).unwrap();

    let mut doc = MemoryDocument::open(&path).unwrap();
    doc.sheet_mut("Spreadsheet")
        .unwrap()
        .set_quantity("B2", "25 mm")
        .unwrap();
    doc.recompute().unwrap();
    doc.save().unwrap();

    let reopened = MemoryDocument::open(&path).unwrap();
    assert_eq!(reopened.container("Panel").unwrap().value("width"), Some(25.0));
}

#[test]
fn test_save_as_leaves_original() {
    let dir = TempDir::new().unwrap();
    let original = dir.path().join("part.yaml");
    let copy = dir.path().join("copy.yaml");
    fs::copy(test_data_path("part.yaml"), &original).unwrap();
    let before = fs::read_to_string(&original).unwrap();

    let mut doc = MemoryDocument::open(&original).unwrap();
    doc.remove_object("VarSet").unwrap();
    doc.save_as(&copy).unwrap();

    assert_eq!(fs::read_to_string(&original).unwrap(), before);
    assert_eq!(doc.path(), Some(copy.as_path()));

    let saved = MemoryDocument::open(&copy).unwrap();
    assert_eq!(saved.objects_of(ObjectKind::VarSet).len(), 1);
}
