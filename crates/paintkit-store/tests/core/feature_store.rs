use paintkit_core::{BBox, FeatureId, PolygonGeometry, Position};
use paintkit_store::action::{Action, BrushOptions};
use paintkit_store::feature::{BrushMode, Feature, FeatureProperties};
use paintkit_store::store::FeatureStore;
use proptest::prelude::*;

fn rect(id: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Feature {
    Feature::new(
        FeatureId::from(id),
        PolygonGeometry::rectangle(min_x, min_y, max_x, max_y),
        FeatureProperties::default(),
    )
}

#[test]
fn test_add_square_to_empty_store() {
    let mut store = FeatureStore::new();
    let square: PolygonGeometry = serde_json::from_str("[[[0,0],[10,0],[10,10],[0,10],[0,0]]]").unwrap();
    let feature = Feature::new(FeatureId::from("sq"), square, FeatureProperties::default());

    store.apply(&Action::add(feature, BrushMode::Add)).unwrap();

    assert_eq!(store.len(), 1);
    let only = store.features().next().unwrap();
    assert_eq!(*only.bbox(), BBox::new(0.0, 0.0, 10.0, 10.0));
    store.check_consistency().unwrap();
}

#[test]
fn test_subtract_covering_brush_removes_feature() {
    let mut store = FeatureStore::new();
    store
        .apply(&Action::add(rect("a", 0.0, 0.0, 10.0, 10.0), BrushMode::Add))
        .unwrap();

    let changes = store
        .apply(&Action::add(
            rect("brush", -10.0, -10.0, 20.0, 20.0),
            BrushMode::Subtract,
        ))
        .unwrap();

    assert_eq!(changes.removed, vec![FeatureId::from("a")]);
    assert!(changes.added.is_empty());
    assert!(store.is_empty());
    store.check_consistency().unwrap();
}

#[test]
fn test_remove_missing_id_on_empty_store() {
    let mut store = FeatureStore::new();
    let changes = store
        .apply(&Action::remove(vec![FeatureId::from("missing-id")]))
        .unwrap();
    assert!(changes.is_empty());
    assert!(store.is_empty());
}

#[test]
fn test_add_fold_uses_initial_overlaps_only() {
    // "c" overlaps "a" but not the brush itself, so the single pass that
    // merges "a" leaves "c" alone.
    let mut store = FeatureStore::new();
    let no_merge = BrushOptions { merge: false };
    store
        .add_feature(rect("a", 0.0, 0.0, 10.0, 10.0), BrushMode::Add, no_merge)
        .unwrap();
    store
        .add_feature(rect("c", -5.0, 0.0, 2.0, 10.0), BrushMode::Add, no_merge)
        .unwrap();

    store
        .add_feature(
            rect("brush", 5.0, 0.0, 15.0, 10.0),
            BrushMode::Add,
            BrushOptions::default(),
        )
        .unwrap();

    assert!(store.contains(&FeatureId::from("c")));
    assert!(!store.contains(&FeatureId::from("a")));
    let merged = store.feature(&FeatureId::from("brush")).unwrap();
    assert_eq!(*merged.bbox(), BBox::new(0.0, 0.0, 15.0, 10.0));
}

#[test]
fn test_visible_features_sorted_by_id() {
    let mut store = FeatureStore::new();
    for (i, id) in ["z", "m", "a"].iter().enumerate() {
        let x = i as f64 * 20.0;
        store
            .add_feature(rect(id, x, 0.0, x + 10.0, 10.0), BrushMode::Add, BrushOptions::default())
            .unwrap();
    }
    let visible: Vec<&str> = store
        .get_visible_features(&BBox::new(-1.0, -1.0, 100.0, 100.0))
        .iter()
        .map(|f| f.id().as_str())
        .collect();
    assert_eq!(visible, vec!["a", "m", "z"]);

    let partial = store.get_visible_features(&BBox::new(15.0, 0.0, 25.0, 5.0));
    assert_eq!(partial.len(), 1);
}

#[test]
fn test_point_hit_over_selects_by_bbox() {
    let mut store = FeatureStore::new();
    let triangle = Feature::new(
        FeatureId::from("t"),
        PolygonGeometry::from_exterior(vec![
            Position::new(0.0, 0.0),
            Position::new(10.0, 0.0),
            Position::new(0.0, 10.0),
        ])
        .unwrap(),
        FeatureProperties::default(),
    );
    store
        .add_feature(triangle, BrushMode::Add, BrushOptions::default())
        .unwrap();
    assert_eq!(
        store.get_feature_ids_by_position(Position::new(9.0, 9.0)),
        vec![FeatureId::from("t")]
    );
}

#[test]
fn test_move_onto_neighbour_merges() {
    let mut store = FeatureStore::new();
    let no_merge = BrushOptions { merge: false };
    let a = rect("a", 0.0, 0.0, 10.0, 10.0);
    store.add_feature(a.clone(), BrushMode::Add, no_merge).unwrap();
    store
        .add_feature(rect("b", 30.0, 0.0, 40.0, 10.0), BrushMode::Add, no_merge)
        .unwrap();

    store
        .apply(&Action::MoveBrush {
            feature: a,
            brush_mode: BrushMode::Add,
            translation: Position::new(25.0, 0.0),
            options: BrushOptions::default(),
        })
        .unwrap();

    assert_eq!(store.len(), 1);
    let merged = store.feature(&FeatureId::from("a")).unwrap();
    assert_eq!(*merged.bbox(), BBox::new(25.0, 0.0, 40.0, 10.0));
    store.check_consistency().unwrap();
}

#[test]
fn test_brush_color_action() {
    let mut store = FeatureStore::new();
    store
        .apply(&Action::SetBrushColor {
            color: "#abcdef".to_string(),
        })
        .unwrap();
    assert_eq!(store.brush_color(), "#abcdef");
    assert!(store.is_empty());
}

#[derive(Debug, Clone)]
pub(crate) enum Op {
    Paint(BrushMode, (i32, i32, i32, i32)),
    Remove(usize),
    Move(BrushMode, usize, i32, i32),
}

fn arb_mode() -> impl Strategy<Value = BrushMode> {
    prop_oneof![
        Just(BrushMode::Add),
        Just(BrushMode::Subtract),
        Just(BrushMode::Intersect)
    ]
}

pub(crate) fn arb_op() -> impl Strategy<Value = Op> {
    let rect = (-30i32..30, -30i32..30, 1i32..25, 1i32..25);
    prop_oneof![
        4 => (arb_mode(), rect).prop_map(|(m, r)| Op::Paint(m, r)),
        1 => (0usize..8).prop_map(Op::Remove),
        1 => (arb_mode(), 0usize..8, -20i32..20, -20i32..20)
            .prop_map(|(m, i, dx, dy)| Op::Move(m, i, dx, dy)),
    ]
}

/// Turns a generated op into an action against the current store.
///
/// Moves of a feature index the store does not have are skipped.
pub(crate) fn op_action(store: &FeatureStore, step: usize, op: Op) -> Option<Action> {
    let ids: Vec<FeatureId> = store.features().map(|f| f.id().clone()).collect();
    match op {
        Op::Paint(mode, (x, y, w, h)) => Some(Action::add(
            rect(
                &format!("s{}", step),
                x as f64,
                y as f64,
                (x + w) as f64,
                (y + h) as f64,
            ),
            mode,
        )),
        Op::Remove(i) => Some(match ids.get(i) {
            Some(id) => Action::remove(vec![id.clone()]),
            None => Action::remove(vec![FeatureId::from("absent")]),
        }),
        Op::Move(mode, i, dx, dy) => {
            let feature = ids.get(i).and_then(|id| store.feature(id))?;
            Some(Action::MoveBrush {
                feature: feature.clone(),
                brush_mode: mode,
                translation: Position::new(dx as f64, dy as f64),
                options: BrushOptions::default(),
            })
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn collection_and_index_stay_in_bijection(ops in prop::collection::vec(arb_op(), 1..20)) {
        let mut store = FeatureStore::new();
        for (step, op) in ops.into_iter().enumerate() {
            let Some(action) = op_action(&store, step, op) else {
                continue;
            };
            store.apply(&action).unwrap();
            prop_assert!(store.check_consistency().is_ok());
        }
    }
}
