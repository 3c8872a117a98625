use paintkit_core::{FeatureId, PolygonGeometry};
use paintkit_store::action::{Action, BrushOptions};
use paintkit_store::feature::{BrushMode, Feature, FeatureProperties};
use paintkit_store::history::{ActionLog, HistoryConfig};
use paintkit_store::store::FeatureStore;
use proptest::prelude::*;

use super::feature_store::{arb_op, op_action};

fn rect(id: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Feature {
    Feature::new(
        FeatureId::from(id),
        PolygonGeometry::rectangle(min_x, min_y, max_x, max_y),
        FeatureProperties::default(),
    )
}

/// A session mixing every action kind.
fn session() -> Vec<Action> {
    vec![
        Action::add(rect("f1", 0.0, 0.0, 10.0, 10.0), BrushMode::Add),
        Action::add(rect("f2", 5.0, 5.0, 15.0, 15.0), BrushMode::Add),
        Action::SetBrushColor {
            color: "#ff0000".to_string(),
        },
        Action::add(rect("cut", 7.0, -5.0, 9.0, 30.0), BrushMode::Subtract),
        Action::add(rect("f3", 40.0, 0.0, 50.0, 10.0), BrushMode::Add),
        Action::add(rect("x", 45.0, 5.0, 60.0, 20.0), BrushMode::Intersect),
        Action::MoveBrush {
            feature: rect("f3", 40.0, 0.0, 50.0, 10.0),
            brush_mode: BrushMode::Add,
            translation: paintkit_core::Position::new(0.0, 30.0),
            options: BrushOptions::default(),
        },
        Action::remove(vec![FeatureId::from("cut/1"), FeatureId::from("nope")]),
    ]
}

#[test]
fn test_undo_redo_disjoint_adds() {
    let mut store = FeatureStore::new();
    let mut log = ActionLog::new();
    log.apply(&mut store, Action::add(rect("F1", 0.0, 0.0, 10.0, 10.0), BrushMode::Add))
        .unwrap();
    log.apply(&mut store, Action::add(rect("F2", 20.0, 0.0, 30.0, 10.0), BrushMode::Add))
        .unwrap();
    let before = store.snapshot();

    assert!(log.undo(&mut store).unwrap());
    let ids: Vec<&str> = store.features().map(|f| f.id().as_str()).collect();
    assert_eq!(ids, vec!["F1"]);

    assert!(log.redo(&mut store).unwrap());
    assert_eq!(store.snapshot(), before);
    store.check_consistency().unwrap();
}

#[test]
fn test_undo_depth_tracking() {
    let mut store = FeatureStore::new();
    let mut log = ActionLog::new();
    for action in session() {
        log.apply(&mut store, action).unwrap();
    }
    let n = session().len();
    assert_eq!(log.undo_depth(), n);

    for _ in 0..n {
        log.undo(&mut store).unwrap();
    }
    assert_eq!(log.undo_depth(), 0);
    assert_eq!(log.redo_depth(), n);
    assert!(store.is_empty());
    assert_eq!(store.brush_color(), "#000000");
}

#[test]
fn test_replay_is_deterministic() {
    let mut live = FeatureStore::new();
    for action in session() {
        live.apply(&action).unwrap();
    }

    let mut replayed = FeatureStore::new();
    let mut log = ActionLog::from_parts(None, session(), HistoryConfig::default());
    log.rebuild(&mut replayed).unwrap();

    assert_eq!(
        serde_json::to_string(&live.snapshot()).unwrap(),
        serde_json::to_string(&replayed.snapshot()).unwrap()
    );
}

#[test]
fn test_undo_all_redo_all_round_trip() {
    let mut store = FeatureStore::new();
    let mut log = ActionLog::new();
    for action in session() {
        log.apply(&mut store, action).unwrap();
    }
    let finished = store.snapshot();

    while log.undo(&mut store).unwrap() {}
    while log.redo(&mut store).unwrap() {}

    assert_eq!(store.snapshot(), finished);
    store.check_consistency().unwrap();
}

#[test]
fn test_undo_prunes_selection() {
    let mut store = FeatureStore::new();
    let mut log = ActionLog::new();
    log.apply(&mut store, Action::add(rect("a", 0.0, 0.0, 10.0, 10.0), BrushMode::Add))
        .unwrap();
    log.apply(&mut store, Action::add(rect("b", 20.0, 0.0, 30.0, 10.0), BrushMode::Add))
        .unwrap();
    store.select(&FeatureId::from("a"), false).unwrap();
    store.select(&FeatureId::from("b"), true).unwrap();

    log.undo(&mut store).unwrap();

    assert_eq!(store.selected_ids(), &[FeatureId::from("a")]);
    assert!(store.feature(&FeatureId::from("a")).unwrap().is_selected());
}

#[test]
fn test_redo_failure_keeps_action() {
    let mut store = FeatureStore::new();
    let mut log = ActionLog::new();
    log.apply(&mut store, Action::add(rect("a", 0.0, 0.0, 10.0, 10.0), BrushMode::Add))
        .unwrap();
    log.undo(&mut store).unwrap();

    // Something outside the log re-used the id in the meantime.
    store
        .add_feature(rect("a", 100.0, 100.0, 110.0, 110.0), BrushMode::Add, BrushOptions::default())
        .unwrap();

    assert!(log.redo(&mut store).is_err());
    assert_eq!(log.redo_depth(), 1);
    assert_eq!(log.undo_depth(), 0);
}

fn run_with(config: HistoryConfig, undo_steps: usize) -> (FeatureStore, ActionLog) {
    let mut store = FeatureStore::new();
    let mut log = ActionLog::with_config(config);
    for action in session() {
        log.apply(&mut store, action).unwrap();
    }
    for _ in 0..undo_steps {
        log.undo(&mut store).unwrap();
    }
    (store, log)
}

proptest! {
    #[test]
    fn bounded_logs_match_full_replay(
        interval in 1usize..5,
        max_depth in 2usize..8,
        undo_steps in 0usize..8,
    ) {
        let (full, _) = run_with(HistoryConfig::default(), undo_steps);

        let (checkpointed, _) = run_with(
            HistoryConfig { max_depth: None, checkpoint_interval: Some(interval) },
            undo_steps,
        );
        prop_assert_eq!(checkpointed.snapshot(), full.snapshot());

        let steps = undo_steps.min(max_depth);
        let (expected, _) = run_with(HistoryConfig::default(), steps);
        let (bounded, log) = run_with(
            HistoryConfig { max_depth: Some(max_depth), checkpoint_interval: Some(interval) },
            undo_steps,
        );
        prop_assert!(log.undo_depth() <= max_depth);
        prop_assert_eq!(bounded.snapshot(), expected.snapshot());
        prop_assert!(bounded.check_consistency().is_ok());
    }
}

fn snapshot_json(store: &FeatureStore) -> String {
    serde_json::to_string(&store.snapshot()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn random_sessions_replay_byte_identically(ops in prop::collection::vec(arb_op(), 1..16)) {
        let mut live = FeatureStore::new();
        let mut log = ActionLog::new();
        for (step, op) in ops.into_iter().enumerate() {
            let Some(action) = op_action(&live, step, op) else {
                continue;
            };
            let before = snapshot_json(&live);
            log.apply(&mut live, action).unwrap();
            let after = snapshot_json(&live);

            prop_assert!(log.undo(&mut live).unwrap());
            prop_assert_eq!(snapshot_json(&live), before);
            prop_assert!(log.redo(&mut live).unwrap());
            prop_assert_eq!(snapshot_json(&live), after);
        }

        let mut replayed = FeatureStore::new();
        let mut fresh = ActionLog::from_parts(None, log.undo_stack().to_vec(), HistoryConfig::default());
        fresh.rebuild(&mut replayed).unwrap();
        prop_assert_eq!(snapshot_json(&replayed), snapshot_json(&live));
        prop_assert!(replayed.check_consistency().is_ok());
    }
}
