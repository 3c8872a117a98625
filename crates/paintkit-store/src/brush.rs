//! Turns finished strokes into features and actions.
//!
//! The hull/simplify stage upstream hands over a single outline ring. This
//! adapter cleans it up, gives it a fresh id and the active brush color, and
//! wraps it in the action the log will record.

use paintkit_core::{FeatureId, IdGenerator, PolygonGeometry, Position, UuidIdGenerator};
use std::fmt;
use tracing::debug;

use crate::action::{Action, BrushOptions};
use crate::feature::{BrushMode, Feature, FeatureProperties};

/// Builds features from stroke outlines.
pub struct BrushAdapter {
    ids: Box<dyn IdGenerator>,
}

impl BrushAdapter {
    /// Adapter minting UUID v4 ids.
    pub fn new() -> Self {
        Self::with_id_generator(Box::new(UuidIdGenerator))
    }

    pub fn with_id_generator(ids: Box<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    pub fn next_id(&mut self) -> FeatureId {
        self.ids.next_id()
    }

    /// Builds a feature from a stroke outline.
    ///
    /// Repeated consecutive points are collapsed and an open ring is closed.
    /// Returns `None` when the outline is degenerate (fewer than three
    /// distinct points, or all points on one line) or a coordinate is not
    /// finite.
    pub fn build_feature(&mut self, stroke: &[Position], color: &str) -> Option<Feature> {
        let mut ring: Vec<Position> = Vec::with_capacity(stroke.len() + 1);
        for p in stroke {
            if ring.last() != Some(p) {
                ring.push(*p);
            }
        }
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        match PolygonGeometry::from_exterior(ring) {
            Ok(geometry) => Some(self.feature_from_geometry(geometry, color)),
            Err(err) => {
                debug!(points = stroke.len(), %err, "degenerate stroke dropped");
                None
            }
        }
    }

    /// Wraps already valid geometry in a feature with a fresh id.
    pub fn feature_from_geometry(&mut self, geometry: PolygonGeometry, color: &str) -> Feature {
        Feature::new(self.ids.next_id(), geometry, FeatureProperties::with_color(color))
    }

    /// `AddBrush` action for a stroke, or `None` for a degenerate one.
    pub fn add_action(
        &mut self,
        stroke: &[Position],
        color: &str,
        mode: BrushMode,
        options: BrushOptions,
    ) -> Option<Action> {
        let feature = self.build_feature(stroke, color)?;
        Some(Action::AddBrush {
            feature,
            brush_mode: mode,
            options,
        })
    }

    /// `MoveBrush` action for dragging `feature` by `translation`.
    pub fn move_action(
        &self,
        feature: &Feature,
        translation: Position,
        mode: BrushMode,
        options: BrushOptions,
    ) -> Action {
        Action::MoveBrush {
            feature: feature.clone(),
            brush_mode: mode,
            translation,
            options,
        }
    }
}

impl Default for BrushAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BrushAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrushAdapter").finish_non_exhaustive()
    }
}
