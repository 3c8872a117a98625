//! Boolean operations between features.
//!
//! Wraps the `csgrs` 2D sketch union/difference/intersection and classifies
//! each result into the outcome the feature store acts on. Operands are
//! simple polygons (with optional holes) in the same coordinate space.

use csgrs::sketch::Sketch;
use csgrs::traits::CSG;
use paintkit_core::geometry::MIN_RING_POINTS;
use paintkit_core::{IdGenerator, PolygonGeometry, Position};
use tracing::trace;

use crate::feature::Feature;

/// Pieces smaller than this are clipping noise and are dropped.
const MIN_PIECE_AREA: f64 = 1e-9;

/// Consecutive points closer than this are collapsed.
const POINT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

/// Result of [`apply_union`].
#[derive(Debug, Clone, PartialEq)]
pub enum UnionOutcome {
    /// The union is empty or falls apart into several polygons; keep both operands.
    NoMerge,
    /// The operands fused into one polygon, carrying the second operand's id.
    Merged(Feature),
}

impl UnionOutcome {
    /// `0` for no merge, `1` for merged.
    pub fn code(&self) -> i32 {
        match self {
            UnionOutcome::NoMerge => 0,
            UnionOutcome::Merged(_) => 1,
        }
    }
}

/// Result of [`apply_difference`].
#[derive(Debug, Clone, PartialEq)]
pub enum DifferenceOutcome {
    /// Nothing of the first operand is left.
    Consumed,
    /// The first operand is untouched.
    Unchanged,
    /// The first operand is replaced by these pieces.
    Replaced(Vec<Feature>),
}

impl DifferenceOutcome {
    /// `-1` when consumed, `0` when unchanged, otherwise the number of pieces.
    pub fn code(&self) -> i32 {
        match self {
            DifferenceOutcome::Consumed => -1,
            DifferenceOutcome::Unchanged => 0,
            DifferenceOutcome::Replaced(pieces) => pieces.len() as i32,
        }
    }
}

/// Runs a boolean operation on two geometries.
pub fn perform_boolean(
    a: &PolygonGeometry,
    b: &PolygonGeometry,
    op: BooleanOp,
) -> Vec<PolygonGeometry> {
    let sketch_a = to_sketch(a);
    let sketch_b = to_sketch(b);

    let result = match op {
        BooleanOp::Union => sketch_a.union(&sketch_b),
        BooleanOp::Difference => sketch_a.difference(&sketch_b),
        BooleanOp::Intersection => sketch_a.intersection(&sketch_b),
    };

    from_sketch(&result)
}

/// Unions `b` into `a`. A merged result keeps `b`'s id and properties.
pub fn apply_union(a: &Feature, b: &Feature) -> UnionOutcome {
    if !a.bbox().intersects(b.bbox()) {
        return UnionOutcome::NoMerge;
    }
    let mut pieces = perform_boolean(a.geometry(), b.geometry(), BooleanOp::Union);
    trace!(a = %a.id(), b = %b.id(), pieces = pieces.len(), "union");
    match pieces.pop() {
        Some(geometry) if pieces.is_empty() => UnionOutcome::Merged(b.with_geometry(geometry)),
        _ => UnionOutcome::NoMerge,
    }
}

/// Subtracts `b` from `a`. Every remaining piece gets a fresh id from `ids`
/// and `a`'s properties.
pub fn apply_difference(a: &Feature, b: &Feature, ids: &mut dyn IdGenerator) -> DifferenceOutcome {
    if !a.bbox().intersects(b.bbox()) {
        return DifferenceOutcome::Unchanged;
    }
    let pieces = perform_boolean(a.geometry(), b.geometry(), BooleanOp::Difference);
    trace!(a = %a.id(), b = %b.id(), pieces = pieces.len(), "difference");
    if pieces.is_empty() {
        return DifferenceOutcome::Consumed;
    }
    if pieces.len() == 1 && pieces[0].same_shape(a.geometry()) {
        return DifferenceOutcome::Unchanged;
    }
    DifferenceOutcome::Replaced(
        pieces
            .into_iter()
            .map(|geometry| Feature::new(ids.next_id(), geometry, a.properties().committed()))
            .collect(),
    )
}

/// Intersects `a` with `b`. Each piece gets a fresh id and `a`'s properties.
pub fn apply_intersection(a: &Feature, b: &Feature, ids: &mut dyn IdGenerator) -> Vec<Feature> {
    if !a.bbox().intersects(b.bbox()) {
        return Vec::new();
    }
    let pieces = perform_boolean(a.geometry(), b.geometry(), BooleanOp::Intersection);
    trace!(a = %a.id(), b = %b.id(), pieces = pieces.len(), "intersection");
    pieces
        .into_iter()
        .map(|geometry| Feature::new(ids.next_id(), geometry, a.properties().committed()))
        .collect()
}

fn open_ring(ring: &[Position]) -> Vec<[f64; 2]> {
    ring[..ring.len() - 1].iter().map(|p| [p.x, p.y]).collect()
}

fn to_sketch(geometry: &PolygonGeometry) -> Sketch<()> {
    let mut sketch = Sketch::polygon(&open_ring(geometry.exterior()), None);
    for hole in geometry.holes() {
        sketch = sketch.difference(&Sketch::polygon(&open_ring(hole), None));
    }
    sketch
}

/// Collects ring coordinates, collapsing repeated points and closing the ring.
fn clean_ring(coords: impl Iterator<Item = (f64, f64)>) -> Vec<Position> {
    let mut ring: Vec<Position> = Vec::new();
    for (x, y) in coords {
        let p = Position::new(x, y);
        if let Some(last) = ring.last() {
            if (last.x - p.x).abs() < POINT_EPSILON && (last.y - p.y).abs() < POINT_EPSILON {
                continue;
            }
        }
        ring.push(p);
    }
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

fn from_sketch(sketch: &Sketch<()>) -> Vec<PolygonGeometry> {
    let mp = sketch.to_multipolygon();
    let mut geometries = Vec::new();
    for poly in mp.0.iter() {
        let exterior = clean_ring(poly.exterior().0.iter().map(|c| (c.x, c.y)));
        if exterior.len() < MIN_RING_POINTS {
            continue;
        }
        let mut rings = vec![exterior];
        for interior in poly.interiors() {
            let hole = clean_ring(interior.0.iter().map(|c| (c.x, c.y)));
            if hole.len() >= MIN_RING_POINTS {
                rings.push(hole);
            }
        }
        match PolygonGeometry::new(rings) {
            Ok(geometry) if geometry.area() > MIN_PIECE_AREA => geometries.push(geometry),
            Ok(_) => trace!("dropping zero-area clip piece"),
            Err(err) => trace!(%err, "dropping malformed clip piece"),
        }
    }
    geometries
}
