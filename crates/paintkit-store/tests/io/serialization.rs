use chrono::{DateTime, Utc};
use paintkit_core::{FeatureId, Position, SequentialIdGenerator};
use paintkit_store::action::BrushOptions;
use paintkit_store::brush::BrushAdapter;
use paintkit_store::document::PaintDocument;
use paintkit_store::feature::BrushMode;
use paintkit_store::serialization::PaintingFile;
use tempfile::TempDir;

fn square(x: f64, y: f64, size: f64) -> Vec<Position> {
    vec![
        Position::new(x, y),
        Position::new(x + size, y),
        Position::new(x + size, y + size),
        Position::new(x, y + size),
    ]
}

fn painted_doc() -> PaintDocument {
    let mut doc = PaintDocument::new().with_brush(BrushAdapter::with_id_generator(Box::new(
        SequentialIdGenerator::new("s"),
    )));
    doc.name = "Sunset".to_string();
    doc.commit_stroke(&square(0.0, 0.0, 10.0), BrushMode::Add, BrushOptions::default())
        .unwrap();
    doc.set_brush_color("#ff8800").unwrap();
    doc.commit_stroke(&square(30.0, 0.0, 10.0), BrushMode::Add, BrushOptions::default())
        .unwrap();
    doc.commit_stroke(&square(2.0, 2.0, 2.0), BrushMode::Subtract, BrushOptions::default())
        .unwrap();
    doc
}

#[test]
fn test_round_trip_with_history() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("painting.json");

    let mut doc = painted_doc();
    doc.save_to_file(&path).unwrap();
    assert!(!doc.is_modified);
    assert_eq!(doc.current_file_path.as_deref(), Some(path.as_path()));

    let mut loaded = PaintDocument::new();
    loaded.load_from_file(&path).unwrap();

    assert_eq!(loaded.name, "Sunset");
    assert_eq!(loaded.store().snapshot(), doc.store().snapshot());
    assert_eq!(loaded.history().undo_depth(), 4);
    assert_eq!(loaded.brush_color(), "#ff8800");

    loaded.undo().unwrap();
    assert!(loaded.store().contains(&FeatureId::from("s-1")));
    loaded.store().check_consistency().unwrap();
}

#[test]
fn test_round_trip_without_history() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("flat.json");

    let mut doc = painted_doc();
    doc.save_history = false;
    doc.save_to_file(&path).unwrap();

    let file = PaintingFile::load_from_file(&path).unwrap();
    assert!(file.history.is_none());

    let mut loaded = PaintDocument::new();
    loaded.load_from_file(&path).unwrap();
    let ids = |d: &PaintDocument| -> Vec<FeatureId> {
        d.store().features().map(|f| f.id().clone()).collect()
    };
    assert_eq!(ids(&loaded), ids(&doc));
    assert_eq!(loaded.brush_color(), "#ff8800");
    let holed = loaded.store().feature(&FeatureId::from("s-3/1")).unwrap();
    assert_eq!(holed.geometry().holes().len(), 1);
    assert!(!loaded.can_undo());
    loaded.store().check_consistency().unwrap();
}

#[test]
fn test_replayed_history_wins_over_edited_features() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("edited.json");

    let mut doc = painted_doc();
    doc.save_to_file(&path).unwrap();

    let mut file = PaintingFile::load_from_file(&path).unwrap();
    file.features.clear();
    file.save_to_file(&path).unwrap();

    let mut loaded = PaintDocument::new();
    loaded.load_from_file(&path).unwrap();
    assert_eq!(loaded.store().snapshot(), doc.store().snapshot());
}

#[test]
fn test_load_failure_leaves_document_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut doc = painted_doc();
    let before = doc.store().snapshot();
    let err = doc.load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse painting file"));
    assert_eq!(doc.store().snapshot(), before);

    let missing = temp_dir.path().join("missing.json");
    assert!(doc.load_from_file(&missing).is_err());
}

#[test]
fn test_resave_keeps_creation_time() {
    let temp_dir = TempDir::new().unwrap();
    let original = temp_dir.path().join("original.json");
    let resaved = temp_dir.path().join("resaved.json");

    let created: DateTime<Utc> = "2020-01-01T00:00:00Z".parse().unwrap();
    let mut file = PaintingFile::new("Old");
    file.metadata.created = created;
    file.metadata.modified = created;
    file.save_to_file(&original).unwrap();

    let mut doc = PaintDocument::new();
    doc.load_from_file(&original).unwrap();
    assert_eq!(doc.created(), Some(created));
    doc.save_to_file(&resaved).unwrap();

    let reloaded = PaintingFile::load_from_file(&resaved).unwrap();
    assert_eq!(reloaded.metadata.created, created);
    assert!(reloaded.metadata.modified > created);

    doc.new_painting();
    assert_eq!(doc.created(), None);
}

#[test]
fn test_first_save_sets_creation_time_once() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("painting.json");

    let mut doc = painted_doc();
    assert_eq!(doc.created(), None);
    doc.save_to_file(&path).unwrap();
    let first = doc.created().unwrap();

    doc.save_to_file(&path).unwrap();
    assert_eq!(doc.created(), Some(first));
    assert_eq!(PaintingFile::load_from_file(&path).unwrap().metadata.created, first);
}
