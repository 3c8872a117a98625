//! The feature store: the committed collection of painted features, its
//! spatial index, and the brush operations that change them.
//!
//! Every mutation is planned first (which ids go, which features arrive),
//! checked, and then committed to the collection and the index together.
//! A rejected plan leaves the store untouched, so the collection and the
//! index never disagree.

use paintkit_core::{BBox, FeatureId, IdGenerator, Position, Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};

use crate::action::{Action, BrushOptions};
use crate::feature::{BrushMode, Feature, DEFAULT_BRUSH_COLOR};
use crate::ops::{apply_difference, apply_intersection, apply_union, DifferenceOutcome, UnionOutcome};
use crate::selection_manager::SelectionManager;
use crate::spatial_index::SpatialIndex;

/// How point queries decide whether a feature is under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTestMode {
    /// The point lies inside the feature's bounding box.
    #[default]
    BoundingBox,
    /// The point lies inside the polygon itself, holes excluded.
    Exact,
}

/// Store construction options.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// Active brush color after construction, `clear` and replay.
    pub default_brush_color: String,
    pub hit_test: HitTestMode,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            default_brush_color: DEFAULT_BRUSH_COLOR.to_string(),
            hit_test: HitTestMode::default(),
        }
    }
}

/// Ids removed from and added to the collection by one mutation.
///
/// A moved feature that keeps its id shows up in both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<FeatureId>,
    pub removed: Vec<FeatureId>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Committed state of a store: the features and the active brush color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub features: Vec<Feature>,
    pub brush_color: String,
}

/// A staged mutation.
#[derive(Debug, Default)]
struct Plan {
    removals: Vec<FeatureId>,
    additions: Vec<Feature>,
}

/// Mints `<brush-id>/<n>` ids for pieces created by one operation, skipping
/// ids that are already in the collection.
struct DerivedIds<'a> {
    base: &'a FeatureId,
    taken: &'a BTreeMap<FeatureId, Feature>,
    next: usize,
}

impl<'a> DerivedIds<'a> {
    fn new(base: &'a FeatureId, taken: &'a BTreeMap<FeatureId, Feature>) -> Self {
        Self { base, taken, next: 0 }
    }
}

impl IdGenerator for DerivedIds<'_> {
    fn next_id(&mut self) -> FeatureId {
        loop {
            self.next += 1;
            let id = self.base.derived(self.next);
            if !self.taken.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Owned collection of painted features plus its spatial index and selection.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    features: BTreeMap<FeatureId, Feature>,
    index: SpatialIndex,
    selection: SelectionManager,
    brush_color: String,
    options: StoreOptions,
}

impl FeatureStore {
    /// Creates an empty store with default options.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            features: BTreeMap::new(),
            index: SpatialIndex::new(),
            selection: SelectionManager::new(),
            brush_color: options.default_brush_color.clone(),
            options,
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn set_hit_test_mode(&mut self, mode: HitTestMode) {
        self.options.hit_test = mode;
    }

    /// Color new strokes are painted with.
    pub fn brush_color(&self) -> &str {
        &self.brush_color
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Applies one action.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the action's preconditions do not hold;
    /// the store is unchanged in that case.
    pub fn apply(&mut self, action: &Action) -> Result<ChangeSet> {
        trace!(action = action.name(), "apply");
        match action {
            Action::AddBrush {
                feature,
                brush_mode,
                options,
            } => self.add_feature(feature.clone(), *brush_mode, *options),
            Action::MoveBrush {
                feature,
                brush_mode,
                translation,
                options,
            } => self.move_feature(feature.clone(), *translation, *brush_mode, *options),
            Action::RemoveBrush { feature_ids } => Ok(self.remove_features(feature_ids)),
            Action::SetBrushColor { color } => {
                debug!(%color, "brush color changed");
                self.brush_color = color.clone();
                Ok(ChangeSet::default())
            }
        }
    }

    /// Paints `brush` into the collection under `mode`.
    ///
    /// - **Add**: the brush absorbs every feature it overlaps and can merge
    ///   with, in one pass over the features it overlapped initially. The
    ///   result keeps the brush id.
    /// - **Subtract**: the brush is carved out of every feature it overlaps.
    ///   The brush itself is not stored.
    /// - **Intersect**: each overlap between the brush and a feature is stored
    ///   as a new feature. Existing features and the brush are left as is.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateFeature`] if the brush id is already used by a
    /// feature that this stroke does not consume.
    pub fn add_feature(
        &mut self,
        brush: Feature,
        mode: BrushMode,
        options: BrushOptions,
    ) -> Result<ChangeSet> {
        let plan = self.plan_add(brush, mode, options, None);
        self.validate(&plan)?;
        Ok(self.commit(plan))
    }

    /// Moves `feature` by `translation` and re-applies it under `mode`.
    ///
    /// The feature's current copy (if any) is removed and the translated copy
    /// is painted in one commit.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidTranslation`] for a non-finite translation or one
    /// whose result is not valid geometry (a coordinate overflows), or the
    /// errors of [`add_feature`](Self::add_feature).
    pub fn move_feature(
        &mut self,
        feature: Feature,
        translation: Position,
        mode: BrushMode,
        options: BrushOptions,
    ) -> Result<ChangeSet> {
        if !translation.x.is_finite() || !translation.y.is_finite() {
            return Err(StoreError::InvalidTranslation {
                dx: translation.x,
                dy: translation.y,
            }
            .into());
        }
        let original = feature.id().clone();
        let moved = feature
            .translated(translation.x, translation.y)
            .map_err(|err| {
                debug!(id = %original, %err, "moved geometry rejected");
                StoreError::InvalidTranslation {
                    dx: translation.x,
                    dy: translation.y,
                }
            })?;
        let mut plan = self.plan_add(moved, mode, options, Some(&original));
        if self.features.contains_key(&original) {
            plan.removals.insert(0, original);
        }
        self.validate(&plan)?;
        Ok(self.commit(plan))
    }

    /// Removes the given features. Unknown ids are ignored.
    pub fn remove_features(&mut self, ids: &[FeatureId]) -> ChangeSet {
        let plan = Plan {
            removals: ids
                .iter()
                .filter(|id| self.features.contains_key(*id))
                .cloned()
                .collect(),
            additions: Vec::new(),
        };
        self.commit(plan)
    }

    /// Features whose bbox overlaps `bbox`, in id order.
    pub fn get_visible_features(&self, bbox: &BBox) -> Vec<&Feature> {
        if self.features.is_empty() {
            return Vec::new();
        }
        let mut ids = self.index.query_by_bbox(bbox);
        ids.sort();
        ids.iter().filter_map(|id| self.features.get(id)).collect()
    }

    /// Ids of the features under `point`, in id order.
    ///
    /// With [`HitTestMode::BoundingBox`] this is a bbox test and may report
    /// features whose polygon does not actually cover the point.
    pub fn get_feature_ids_by_position(&self, point: Position) -> Vec<FeatureId> {
        if self.features.is_empty() {
            return Vec::new();
        }
        let mut ids = self.index.query_by_point(point);
        if self.options.hit_test == HitTestMode::Exact {
            ids.retain(|id| {
                self.features
                    .get(id)
                    .is_some_and(|f| f.geometry().contains_point(point))
            });
        }
        ids.sort();
        ids
    }

    pub fn feature(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.get(id)
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.features.contains_key(id)
    }

    /// All features in id order.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Empties the store: features, index and selection, and resets the brush color.
    pub fn clear(&mut self) {
        self.reset();
        self.selection.clear();
    }

    /// Empties the committed state but keeps the selection for pruning after replay.
    pub(crate) fn reset(&mut self) {
        self.features.clear();
        self.index.clear();
        self.brush_color = self.options.default_brush_color.clone();
    }

    /// Copy of the committed state.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            features: self
                .features
                .values()
                .map(|f| {
                    let mut f = f.clone();
                    f.set_selected(false);
                    f
                })
                .collect(),
            brush_color: self.brush_color.clone(),
        }
    }

    /// Replaces the committed state with `snapshot` and rebuilds the index.
    ///
    /// Selected ids that no longer exist are dropped from the selection.
    pub fn restore(&mut self, snapshot: &StoreSnapshot) {
        self.features = snapshot
            .features
            .iter()
            .map(|f| (f.id().clone(), f.clone()))
            .collect();
        self.index = SpatialIndex::bulk_load(self.features.values());
        self.brush_color = snapshot.brush_color.clone();
        self.sync_selection();
        debug!(features = self.features.len(), "store restored");
    }

    /// Verifies that the collection and the index hold exactly the same ids
    /// under the same boxes.
    pub fn check_consistency(&self) -> std::result::Result<(), StoreError> {
        if self.index.len() != self.features.len() {
            return Err(StoreError::IndexOutOfSync {
                reason: format!(
                    "{} features but {} index entries",
                    self.features.len(),
                    self.index.len()
                ),
            });
        }
        if self.index.tree_size() != self.index.len() {
            return Err(StoreError::IndexOutOfSync {
                reason: format!(
                    "tree holds {} entries for {} ids",
                    self.index.tree_size(),
                    self.index.len()
                ),
            });
        }
        for (id, feature) in &self.features {
            match self.index.bbox_of(id) {
                Some(bbox) if bbox == feature.bbox() => {}
                Some(_) => {
                    return Err(StoreError::IndexOutOfSync {
                        reason: format!("stale bbox for {}", id),
                    })
                }
                None => {
                    return Err(StoreError::IndexOutOfSync {
                        reason: format!("{} is not indexed", id),
                    })
                }
            }
        }
        Ok(())
    }

    // Selection

    /// Selects a feature.
    ///
    /// # Arguments
    ///
    /// * `id` - The feature to select
    /// * `multi` - If `true`, adds to the current selection instead of replacing it
    ///
    /// # Errors
    ///
    /// [`StoreError::FeatureNotFound`] if `id` is not in the collection.
    pub fn select(&mut self, id: &FeatureId, multi: bool) -> Result<()> {
        if !self.features.contains_key(id) {
            return Err(StoreError::FeatureNotFound { id: id.clone() }.into());
        }
        let dropped = self.selection.select(id.clone(), multi);
        self.set_selected_flags(&dropped, false);
        self.set_selected_flags(std::slice::from_ref(id), true);
        Ok(())
    }

    /// Flips the selection state of one feature. Returns the new state.
    pub fn toggle_selection(&mut self, id: &FeatureId) -> Result<bool> {
        if !self.features.contains_key(id) {
            return Err(StoreError::FeatureNotFound { id: id.clone() }.into());
        }
        let selected = self.selection.toggle(id.clone());
        self.set_selected_flags(std::slice::from_ref(id), selected);
        Ok(selected)
    }

    /// Selects the feature under `point`.
    ///
    /// Among several hits, features whose polygon actually covers the point
    /// win over bbox-only hits, then the smallest area wins, then the lowest
    /// id. Clicking empty space without `multi` clears the selection.
    ///
    /// # Returns
    ///
    /// The id of the newly selected feature, or `None` if nothing was hit.
    pub fn select_at(&mut self, point: Position, multi: bool) -> Option<FeatureId> {
        let hit = self
            .get_feature_ids_by_position(point)
            .into_iter()
            .filter_map(|id| self.features.get(&id))
            .min_by(|a, b| {
                let a_in = a.geometry().contains_point(point);
                let b_in = b.geometry().contains_point(point);
                b_in.cmp(&a_in).then(
                    a.geometry()
                        .area()
                        .partial_cmp(&b.geometry().area())
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
            })
            .map(|f| f.id().clone());

        match &hit {
            Some(id) => {
                let dropped = self.selection.select(id.clone(), multi);
                self.set_selected_flags(&dropped, false);
                self.set_selected_flags(std::slice::from_ref(id), true);
            }
            None if !multi => self.deselect_all(),
            None => {}
        }
        hit
    }

    pub fn deselect_all(&mut self) {
        let dropped = self.selection.clear();
        self.set_selected_flags(&dropped, false);
    }

    /// Selects every feature; the last one in id order becomes primary.
    pub fn select_all(&mut self) {
        self.selection.set(self.features.keys().cloned());
        for feature in self.features.values_mut() {
            feature.set_selected(true);
        }
    }

    /// Selected ids, oldest selection first.
    pub fn selected_ids(&self) -> &[FeatureId] {
        self.selection.selected_ids()
    }

    /// The primary (most recently selected) feature.
    pub fn get_selected_feature(&self) -> Option<&Feature> {
        self.selection
            .primary()
            .and_then(|id| self.features.get(id))
    }

    /// Drops selected ids that left the collection and re-syncs the flags.
    pub(crate) fn sync_selection(&mut self) {
        let features = &self.features;
        self.selection.retain(|id| features.contains_key(id));
        for (id, feature) in self.features.iter_mut() {
            feature.set_selected(self.selection.is_selected(id));
        }
    }

    fn set_selected_flags(&mut self, ids: &[FeatureId], selected: bool) {
        for id in ids {
            if let Some(feature) = self.features.get_mut(id) {
                feature.set_selected(selected);
            }
        }
    }

    // Planning

    /// Overlap candidates for `bbox`, in id order.
    fn candidates(&self, bbox: &BBox, exclude: Option<&FeatureId>) -> Vec<&Feature> {
        let mut ids = self.index.query_by_bbox(bbox);
        ids.sort();
        ids.iter()
            .filter(|id| Some(*id) != exclude)
            .filter_map(|id| self.features.get(id))
            .collect()
    }

    fn plan_add(
        &self,
        brush: Feature,
        mode: BrushMode,
        options: BrushOptions,
        exclude: Option<&FeatureId>,
    ) -> Plan {
        let candidates = self.candidates(brush.bbox(), exclude);
        let mut plan = Plan::default();

        match mode {
            BrushMode::Add => {
                let mut acc = brush;
                if options.merge {
                    for existing in &candidates {
                        if let UnionOutcome::Merged(merged) = apply_union(existing, &acc) {
                            plan.removals.push(existing.id().clone());
                            acc = merged;
                        }
                    }
                }
                plan.additions.push(acc);
            }
            BrushMode::Subtract => {
                let mut ids = DerivedIds::new(brush.id(), &self.features);
                for existing in &candidates {
                    match apply_difference(existing, &brush, &mut ids) {
                        DifferenceOutcome::Consumed => {
                            plan.removals.push(existing.id().clone());
                        }
                        DifferenceOutcome::Unchanged => {}
                        DifferenceOutcome::Replaced(pieces) => {
                            plan.removals.push(existing.id().clone());
                            plan.additions.extend(pieces);
                        }
                    }
                }
            }
            BrushMode::Intersect => {
                let mut ids = DerivedIds::new(brush.id(), &self.features);
                for existing in &candidates {
                    plan.additions
                        .extend(apply_intersection(existing, &brush, &mut ids));
                }
            }
        }

        debug!(
            %mode,
            candidates = candidates.len(),
            removals = plan.removals.len(),
            additions = plan.additions.len(),
            "planned stroke"
        );
        plan
    }

    fn validate(&self, plan: &Plan) -> std::result::Result<(), StoreError> {
        let removing: HashSet<&FeatureId> = plan.removals.iter().collect();
        let mut adding: HashSet<&FeatureId> = HashSet::new();
        for feature in &plan.additions {
            let id = feature.id();
            let stays = self.features.contains_key(id) && !removing.contains(id);
            if stays || !adding.insert(id) {
                return Err(StoreError::DuplicateFeature { id: id.clone() });
            }
        }
        Ok(())
    }

    /// Applies a validated plan to the collection and the index.
    fn commit(&mut self, plan: Plan) -> ChangeSet {
        let mut changes = ChangeSet::default();
        for id in plan.removals {
            if self.features.remove(&id).is_some() {
                self.index.remove(&id);
                changes.removed.push(id);
            }
        }
        for mut feature in plan.additions {
            feature.set_selected(self.selection.is_selected(feature.id()));
            self.index.insert(&feature);
            changes.added.push(feature.id().clone());
            self.features.insert(feature.id().clone(), feature);
        }
        if !changes.removed.is_empty() {
            let features = &self.features;
            self.selection.retain(|id| features.contains_key(id));
        }
        debug!(
            added = changes.added.len(),
            removed = changes.removed.len(),
            total = self.features.len(),
            "committed"
        );
        changes
    }
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new()
    }
}
