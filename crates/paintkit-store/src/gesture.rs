//! In-progress drag of a feature.
//!
//! While the pointer moves, the dragged feature is only previewed; the store
//! is not touched. The drag becomes a single `MoveBrush` action when the
//! gesture finishes, so the history never sees partial moves.

use paintkit_core::{FeatureId, GeometryError, Position};

use crate::action::{Action, BrushOptions};
use crate::feature::{BrushMode, Feature};
use crate::store::FeatureStore;

/// Transient state of one drag.
#[derive(Debug, Clone)]
pub struct MoveGesture {
    feature: Feature,
    origin: Position,
    current: Position,
}

impl MoveGesture {
    /// Starts dragging the topmost feature under `at`.
    ///
    /// The selected feature wins if it is under the pointer; otherwise the
    /// first hit in id order is used. Returns `None` when nothing is hit.
    pub fn begin(store: &FeatureStore, at: Position) -> Option<Self> {
        let hits = store.get_feature_ids_by_position(at);
        let selected = store
            .get_selected_feature()
            .filter(|f| hits.contains(f.id()))
            .map(|f| f.id().clone());
        let id = selected.or_else(|| hits.into_iter().next())?;
        Self::begin_with(store, &id, at)
    }

    /// Starts dragging a specific feature.
    pub fn begin_with(store: &FeatureStore, id: &FeatureId, at: Position) -> Option<Self> {
        let feature = store.feature(id)?.clone();
        Some(Self {
            feature,
            origin: at,
            current: at,
        })
    }

    pub fn feature_id(&self) -> &FeatureId {
        self.feature.id()
    }

    /// Pointer moved to `to`.
    pub fn update(&mut self, to: Position) {
        self.current = to;
    }

    /// Offset from where the drag started.
    pub fn translation(&self) -> Position {
        Position::new(self.current.x - self.origin.x, self.current.y - self.origin.y)
    }

    /// The dragged feature at its current preview position.
    ///
    /// Fails when the drag pushes a coordinate out of the finite range.
    pub fn preview(&self) -> Result<Feature, GeometryError> {
        let t = self.translation();
        self.feature.translated(t.x, t.y)
    }

    /// Ends the drag, producing the action to record.
    ///
    /// Returns `None` if the feature ended up where it started.
    pub fn finish(self, mode: BrushMode, options: BrushOptions) -> Option<Action> {
        let translation = self.translation();
        if translation.x == 0.0 && translation.y == 0.0 {
            return None;
        }
        Some(Action::MoveBrush {
            feature: self.feature,
            brush_mode: mode,
            translation,
            options,
        })
    }

    /// Abandons the drag. Nothing is recorded.
    pub fn cancel(self) {}
}
