//! Spatial index over feature bounding boxes.
//!
//! An R-tree keyed by each feature's bbox, answering "which features may
//! overlap this region or point" without scanning the collection. Queries are
//! broad phase only: callers needing exact polygon tests follow up with a
//! geometric check.

use paintkit_core::{BBox, FeatureId, Position};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

use crate::feature::Feature;

/// R-tree entry: a feature id and the envelope it was inserted with.
#[derive(Debug, Clone, PartialEq)]
struct IndexEntry {
    id: FeatureId,
    envelope: AABB<[f64; 2]>,
}

impl IndexEntry {
    fn new(id: FeatureId, bbox: &BBox) -> Self {
        Self {
            id,
            envelope: envelope_of(bbox),
        }
    }
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope_of(bbox: &BBox) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y])
}

/// Statistics about the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialIndexStats {
    /// Number of indexed features
    pub total_items: usize,
    /// Box covering every indexed feature, `None` when empty
    pub bounds: Option<BBox>,
}

/// Bounding-box tree over features.
///
/// Holds at most one entry per feature id. The bbox each id was inserted
/// with is kept alongside the tree so entries can be removed by id alone.
#[derive(Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexEntry>,
    entries: HashMap<FeatureId, BBox>,
}

impl SpatialIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            entries: HashMap::new(),
        }
    }

    /// Builds an index from a batch of features.
    pub fn bulk_load<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Self {
        let mut entries = HashMap::new();
        let items: Vec<IndexEntry> = features
            .into_iter()
            .filter(|f| entries.insert(f.id().clone(), *f.bbox()).is_none())
            .map(|f| IndexEntry::new(f.id().clone(), f.bbox()))
            .collect();
        Self {
            tree: RTree::bulk_load(items),
            entries,
        }
    }

    /// Indexes a feature under its current bbox, replacing any entry with the same id.
    pub fn insert(&mut self, feature: &Feature) {
        self.remove(feature.id());
        trace!(id = %feature.id(), "index insert");
        self.tree
            .insert(IndexEntry::new(feature.id().clone(), feature.bbox()));
        self.entries.insert(feature.id().clone(), *feature.bbox());
    }

    /// Removes the entry for `id`. Returns `false` when the id was not indexed.
    pub fn remove(&mut self, id: &FeatureId) -> bool {
        match self.entries.remove(id) {
            Some(bbox) => {
                trace!(%id, "index remove");
                self.tree.remove(&IndexEntry::new(id.clone(), &bbox)).is_some()
            }
            None => false,
        }
    }

    /// Ids of every feature whose bbox overlaps `bbox` (edges included).
    pub fn query_by_bbox(&self, bbox: &BBox) -> Vec<FeatureId> {
        self.tree
            .locate_in_envelope_intersecting(&envelope_of(bbox))
            .map(|entry| entry.id.clone())
            .collect()
    }

    /// Ids of every feature whose bbox contains `point`.
    pub fn query_by_point(&self, point: Position) -> Vec<FeatureId> {
        self.query_by_bbox(&BBox::from_point(point))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.entries.contains_key(id)
    }

    /// The bbox `id` is indexed under.
    pub fn bbox_of(&self, id: &FeatureId) -> Option<&BBox> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed ids, unordered.
    pub fn ids(&self) -> impl Iterator<Item = &FeatureId> {
        self.entries.keys()
    }

    /// Number of entries in the tree itself, which must equal [`len`](Self::len).
    pub(crate) fn tree_size(&self) -> usize {
        self.tree.size()
    }

    pub fn stats(&self) -> SpatialIndexStats {
        let bounds = self.entries.values().copied().reduce(|a, b| a.union(&b));
        SpatialIndexStats {
            total_items: self.entries.len(),
            bounds,
        }
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.entries.len())
            .finish()
    }
}
