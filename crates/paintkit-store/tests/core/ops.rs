use paintkit_core::{FeatureId, PolygonGeometry, SequentialIdGenerator};
use paintkit_store::feature::{Feature, FeatureProperties};
use paintkit_store::ops::{
    apply_difference, apply_intersection, apply_union, DifferenceOutcome, UnionOutcome,
};
use proptest::prelude::*;

fn rect(id: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Feature {
    Feature::new(
        FeatureId::from(id),
        PolygonGeometry::rectangle(min_x, min_y, max_x, max_y),
        FeatureProperties::with_color(id),
    )
}

fn overlap_area(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> f64 {
    let w = (a.2.min(b.2) - a.0.max(b.0)).max(0.0);
    let h = (a.3.min(b.3) - a.1.max(b.1)).max(0.0);
    w * h
}

#[test]
fn test_union_far_apart_is_no_merge() {
    let a = rect("a", 0.0, 0.0, 10.0, 10.0);
    let b = rect("b", 10.5, 0.0, 20.0, 10.0);
    let outcome = apply_union(&a, &b);
    assert_eq!(outcome, UnionOutcome::NoMerge);
    assert_eq!(outcome.code(), 0);
}

#[test]
fn test_union_contained_keeps_outer_shape() {
    let outer = rect("outer", 0.0, 0.0, 10.0, 10.0);
    let inner = rect("inner", 2.0, 2.0, 4.0, 4.0);
    match apply_union(&outer, &inner) {
        UnionOutcome::Merged(f) => {
            assert_eq!(f.id().as_str(), "inner");
            assert!((f.geometry().area() - 100.0).abs() < 1e-6);
        }
        UnionOutcome::NoMerge => panic!("contained brush must merge"),
    }
}

#[test]
fn test_difference_disjoint_is_unchanged() {
    let a = rect("a", 0.0, 0.0, 10.0, 10.0);
    let b = rect("b", 30.0, 30.0, 40.0, 40.0);
    let mut ids = SequentialIdGenerator::new("p");
    let outcome = apply_difference(&a, &b, &mut ids);
    assert_eq!(outcome, DifferenceOutcome::Unchanged);
    assert_eq!(outcome.code(), 0);
}

#[test]
fn test_difference_outcome_codes() {
    let a = rect("a", 0.0, 0.0, 30.0, 10.0);
    let mut ids = SequentialIdGenerator::new("p");
    assert_eq!(
        apply_difference(&a, &rect("c", 10.0, -1.0, 20.0, 11.0), &mut ids).code(),
        2
    );
    assert_eq!(
        apply_difference(&a, &rect("all", -1.0, -1.0, 31.0, 11.0), &mut ids).code(),
        -1
    );
}

fn arb_rect() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (-20i32..20, -20i32..20, 1i32..20, 1i32..20)
        .prop_map(|(x, y, w, h)| (x as f64, y as f64, (x + w) as f64, (y + h) as f64))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn difference_is_total_and_preserves_area(a in arb_rect(), b in arb_rect()) {
        let fa = rect("a", a.0, a.1, a.2, a.3);
        let fb = rect("b", b.0, b.1, b.2, b.3);
        let mut ids = SequentialIdGenerator::new("p");
        let area_a = (a.2 - a.0) * (a.3 - a.1);
        let expected = area_a - overlap_area(a, b);

        match apply_difference(&fa, &fb, &mut ids) {
            DifferenceOutcome::Consumed => prop_assert!(expected.abs() < 1e-6),
            DifferenceOutcome::Unchanged => prop_assert!((expected - area_a).abs() < 1e-6),
            DifferenceOutcome::Replaced(pieces) => {
                prop_assert!(!pieces.is_empty());
                let total: f64 = pieces.iter().map(|p| p.geometry().area()).sum();
                prop_assert!((total - expected).abs() < 1e-6);
                for piece in &pieces {
                    prop_assert_ne!(piece.id().as_str(), "a");
                    prop_assert_eq!(piece.color(), "a");
                }
            }
        }
    }

    #[test]
    fn intersection_area_matches_overlap(a in arb_rect(), b in arb_rect()) {
        let fa = rect("a", a.0, a.1, a.2, a.3);
        let fb = rect("b", b.0, b.1, b.2, b.3);
        let mut ids = SequentialIdGenerator::new("p");
        let total: f64 = apply_intersection(&fa, &fb, &mut ids)
            .iter()
            .map(|p| p.geometry().area())
            .sum();
        prop_assert!((total - overlap_area(a, b)).abs() < 1e-6);
    }
}
