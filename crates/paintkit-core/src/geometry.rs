//! Geometry primitives shared by every PaintKit layer.
//!
//! A [`PolygonGeometry`] is an ordered list of closed rings: ring 0 is the
//! outer boundary, the rest are holes. Construction validates the ring
//! invariants, so a value of this type is always well formed. [`BBox`] is
//! never edited by hand; it is always derived with [`compute_bbox`].

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Minimum number of points in a ring: three distinct plus the closing point.
pub const MIN_RING_POINTS: usize = 4;

/// Tolerance used when comparing ring sets for equality.
pub const SHAPE_EPSILON: f64 = 1e-9;

/// A 2D coordinate in world space. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this position moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    fn approx_eq(&self, other: &Position, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl From<[f64; 2]> for Position {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Position {
    fn from(p: (f64, f64)) -> Self {
        Self::new(p.0, p.1)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    /// Creates a box from its corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Zero-area box at a point, used for point queries.
    pub fn from_point(p: Position) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Centre of the box.
    pub fn center(&self) -> Position {
        Position::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Inclusive overlap test: boxes that only touch on an edge overlap.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Inclusive point containment.
    pub fn contains_point(&self, p: Position) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }
}

/// Polygon with an outer ring and optional holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Position>>", into = "Vec<Vec<Position>>")]
pub struct PolygonGeometry {
    rings: Vec<Vec<Position>>,
}

impl PolygonGeometry {
    /// Creates a polygon from closed rings, validating every ring.
    pub fn new(rings: Vec<Vec<Position>>) -> Result<Self, GeometryError> {
        if rings.is_empty() {
            return Err(GeometryError::Empty);
        }
        for (ring_index, ring) in rings.iter().enumerate() {
            validate_ring(ring_index, ring)?;
        }
        Ok(Self { rings })
    }

    /// Creates a polygon without holes, closing the ring when needed.
    pub fn from_exterior(mut points: Vec<Position>) -> Result<Self, GeometryError> {
        if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
            if first != last {
                points.push(first);
            }
        }
        Self::new(vec![points])
    }

    /// Axis-aligned rectangle polygon, counter-clockwise.
    ///
    /// Not validated: callers pass `min < max` on both axes.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            rings: vec![vec![
                Position::new(min_x, min_y),
                Position::new(max_x, min_y),
                Position::new(max_x, max_y),
                Position::new(min_x, max_y),
                Position::new(min_x, min_y),
            ]],
        }
    }

    /// All rings, outer boundary first.
    pub fn rings(&self) -> &[Vec<Position>] {
        &self.rings
    }

    /// The outer boundary.
    pub fn exterior(&self) -> &[Position] {
        &self.rings[0]
    }

    /// The holes, possibly none.
    pub fn holes(&self) -> &[Vec<Position>] {
        &self.rings[1..]
    }

    pub fn into_rings(self) -> Vec<Vec<Position>> {
        self.rings
    }

    /// Returns a copy moved by `(dx, dy)`.
    ///
    /// The moved rings are validated again, so a translation that overflows
    /// a coordinate or collapses a ring through rounding is an error.
    pub fn translated(&self, dx: f64, dy: f64) -> Result<Self, GeometryError> {
        Self::new(
            self.rings
                .iter()
                .map(|ring| ring.iter().map(|p| p.translated(dx, dy)).collect())
                .collect(),
        )
    }

    /// Enclosed area: outer ring minus holes.
    pub fn area(&self) -> f64 {
        let outer = signed_area(self.exterior()).abs();
        let holes: f64 = self.holes().iter().map(|h| signed_area(h).abs()).sum();
        outer - holes
    }

    /// Exact containment (even-odd rule, points inside a hole are outside).
    pub fn contains_point(&self, p: Position) -> bool {
        ring_contains(self.exterior(), p) && !self.holes().iter().any(|h| ring_contains(h, p))
    }

    /// Compares ring sets independently of each ring's start vertex and
    /// winding, and of hole order.
    pub fn same_shape(&self, other: &PolygonGeometry) -> bool {
        if self.rings.len() != other.rings.len() {
            return false;
        }
        let a = self.normalized_rings();
        let b = other.normalized_rings();
        a.iter().zip(b.iter()).all(|(ra, rb)| {
            ra.len() == rb.len()
                && ra
                    .iter()
                    .zip(rb.iter())
                    .all(|(pa, pb)| pa.approx_eq(pb, SHAPE_EPSILON))
        })
    }

    /// Open rings, outer counter-clockwise and holes clockwise, each starting
    /// at its lowest point, holes sorted by that point.
    fn normalized_rings(&self) -> Vec<Vec<Position>> {
        let mut rings: Vec<Vec<Position>> = self
            .rings
            .iter()
            .enumerate()
            .map(|(i, ring)| normalize_ring(ring, i == 0))
            .collect();
        rings[1..].sort_by(|a, b| compare_positions(&a[0], &b[0]));
        rings
    }
}

impl TryFrom<Vec<Vec<Position>>> for PolygonGeometry {
    type Error = GeometryError;

    fn try_from(rings: Vec<Vec<Position>>) -> Result<Self, Self::Error> {
        Self::new(rings)
    }
}

impl From<PolygonGeometry> for Vec<Vec<Position>> {
    fn from(geometry: PolygonGeometry) -> Self {
        geometry.rings
    }
}

/// Bounding box of every ring of the geometry.
pub fn compute_bbox(geometry: &PolygonGeometry) -> BBox {
    let mut bbox = BBox::new(
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    );
    for p in geometry.rings.iter().flatten() {
        bbox.min_x = bbox.min_x.min(p.x);
        bbox.min_y = bbox.min_y.min(p.y);
        bbox.max_x = bbox.max_x.max(p.x);
        bbox.max_y = bbox.max_y.max(p.y);
    }
    bbox
}

/// Centre of a bounding box.
pub fn bbox_center(bbox: &BBox) -> Position {
    bbox.center()
}

fn validate_ring(ring_index: usize, ring: &[Position]) -> Result<(), GeometryError> {
    if ring.len() < MIN_RING_POINTS {
        return Err(GeometryError::RingTooShort {
            ring_index,
            points: ring.len(),
        });
    }
    if let Some(point_index) = ring.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate {
            ring_index,
            point_index,
        });
    }
    if ring.first() != ring.last() {
        return Err(GeometryError::RingNotClosed { ring_index });
    }
    if is_collinear(ring) {
        return Err(GeometryError::Degenerate { ring_index });
    }
    Ok(())
}

/// True when every point of the ring lies on one line (including the case
/// of fewer than three distinct points).
fn is_collinear(ring: &[Position]) -> bool {
    let origin = ring[0];
    let Some(axis) = ring.iter().find(|p| **p != origin) else {
        return true;
    };
    let (ax, ay) = (axis.x - origin.x, axis.y - origin.y);
    ring.iter()
        .all(|p| ax * (p.y - origin.y) - ay * (p.x - origin.x) == 0.0)
}

/// Shoelace area; positive for counter-clockwise rings.
fn signed_area(ring: &[Position]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}

fn ring_contains(ring: &[Position], p: Position) -> bool {
    let mut inside = false;
    for w in ring.windows(2) {
        let (a, b) = (w[0], w[1]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

fn compare_positions(a: &Position, b: &Position) -> std::cmp::Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

fn normalize_ring(ring: &[Position], outer: bool) -> Vec<Position> {
    let mut open: Vec<Position> = ring[..ring.len() - 1].to_vec();
    let ccw = signed_area(ring) > 0.0;
    if ccw != outer {
        open.reverse();
    }
    let start = open
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| compare_positions(a, b))
        .map(|(i, _)| i)
        .unwrap_or(0);
    open.rotate_left(start);
    open
}
