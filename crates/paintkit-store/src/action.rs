//! Replayable edit actions.
//!
//! Every committed change to a painting is one of these values. The action
//! log stores them, and undo rebuilds state by replaying them in order, so
//! an action must carry everything needed to reproduce its effect.

use paintkit_core::{FeatureId, Position};
use serde::{Deserialize, Serialize};

use crate::feature::{BrushMode, Feature};

/// Per-stroke switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushOptions {
    /// When `false`, an ADD stroke is inserted as its own feature without
    /// merging into anything it overlaps.
    #[serde(default = "default_merge")]
    pub merge: bool,
}

fn default_merge() -> bool {
    true
}

impl Default for BrushOptions {
    fn default() -> Self {
        Self { merge: true }
    }
}

/// A recorded edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Paint a new stroke.
    AddBrush {
        feature: Feature,
        brush_mode: BrushMode,
        #[serde(default)]
        options: BrushOptions,
    },
    /// Move an existing feature, then re-apply it under `brush_mode`.
    ///
    /// `feature` is the feature as it was before the move; the store
    /// translates it.
    MoveBrush {
        feature: Feature,
        brush_mode: BrushMode,
        translation: Position,
        #[serde(default)]
        options: BrushOptions,
    },
    /// Delete features by id. Unknown ids are ignored.
    RemoveBrush {
        #[serde(alias = "featureIds")]
        feature_ids: Vec<FeatureId>,
    },
    /// Change the active brush color used for new strokes.
    SetBrushColor { color: String },
}

impl Action {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddBrush { .. } => "add_brush",
            Action::MoveBrush { .. } => "move_brush",
            Action::RemoveBrush { .. } => "remove_brush",
            Action::SetBrushColor { .. } => "set_brush_color",
        }
    }

    pub fn add(feature: Feature, brush_mode: BrushMode) -> Self {
        Action::AddBrush {
            feature,
            brush_mode,
            options: BrushOptions::default(),
        }
    }

    pub fn remove(feature_ids: impl IntoIterator<Item = FeatureId>) -> Self {
        Action::RemoveBrush {
            feature_ids: feature_ids.into_iter().collect(),
        }
    }
}
