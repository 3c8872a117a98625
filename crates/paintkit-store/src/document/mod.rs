//! Painting document: the facade the UI talks to.
//!
//! Owns the feature store, its action log and the brush adapter, and routes
//! every committed change through the log so undo always works.
//!
//! - `file_io`: save/load of painting files

mod file_io;

use chrono::{DateTime, Utc};
use paintkit_core::{BBox, FeatureId, Position, Result, StoreError};
use std::path::PathBuf;

use crate::action::{Action, BrushOptions};
use crate::brush::BrushAdapter;
use crate::feature::{BrushMode, Feature};
use crate::gesture::MoveGesture;
use crate::history::{ActionLog, HistoryConfig};
use crate::store::{ChangeSet, FeatureStore, StoreOptions};

/// One open painting.
#[derive(Debug)]
pub struct PaintDocument {
    store: FeatureStore,
    history: ActionLog,
    brush: BrushAdapter,
    pub name: String,
    pub current_file_path: Option<PathBuf>,
    pub is_modified: bool,
    /// Whether saved files carry the undo history.
    pub save_history: bool,
    /// Creation time of the painting file, once saved or loaded.
    created: Option<DateTime<Utc>>,
}

impl PaintDocument {
    /// Creates an empty document with default options.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default(), HistoryConfig::default())
    }

    pub fn with_options(options: StoreOptions, history: HistoryConfig) -> Self {
        Self {
            store: FeatureStore::with_options(options),
            history: ActionLog::with_config(history),
            brush: BrushAdapter::new(),
            name: "Untitled".to_string(),
            current_file_path: None,
            is_modified: false,
            save_history: true,
            created: None,
        }
    }

    /// Replaces the brush adapter, e.g. to use deterministic ids.
    pub fn with_brush(mut self, brush: BrushAdapter) -> Self {
        self.brush = brush;
        self
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    /// When the painting was first saved, if it has been.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn history(&self) -> &ActionLog {
        &self.history
    }

    /// Applies and records an action.
    pub fn apply_action(&mut self, action: Action) -> Result<ChangeSet> {
        let changes = self.history.apply(&mut self.store, action)?;
        self.is_modified = true;
        Ok(changes)
    }

    pub fn undo(&mut self) -> Result<bool> {
        let undone = self.history.undo(&mut self.store)?;
        self.is_modified |= undone;
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool> {
        let redone = self.history.redo(&mut self.store)?;
        self.is_modified |= redone;
        Ok(redone)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Paints a finished stroke outline with the active brush color.
    ///
    /// Returns `Ok(None)` for a degenerate stroke; nothing is recorded then.
    pub fn commit_stroke(
        &mut self,
        stroke: &[Position],
        mode: BrushMode,
        options: BrushOptions,
    ) -> Result<Option<ChangeSet>> {
        let color = self.store.brush_color().to_string();
        match self.brush.add_action(stroke, &color, mode, options) {
            Some(action) => self.apply_action(action).map(Some),
            None => Ok(None),
        }
    }

    /// Moves a committed feature by `translation`.
    ///
    /// # Errors
    ///
    /// [`StoreError::FeatureNotFound`] if `id` is not in the painting.
    pub fn commit_move(
        &mut self,
        id: &FeatureId,
        translation: Position,
        mode: BrushMode,
        options: BrushOptions,
    ) -> Result<ChangeSet> {
        let feature = self
            .store
            .feature(id)
            .ok_or_else(|| StoreError::FeatureNotFound { id: id.clone() })?;
        let action = self.brush.move_action(feature, translation, mode, options);
        self.apply_action(action)
    }

    /// Starts dragging whatever is under `at`.
    pub fn begin_move(&self, at: Position) -> Option<MoveGesture> {
        MoveGesture::begin(&self.store, at)
    }

    /// Commits a finished drag. A drag that went nowhere records nothing.
    pub fn finish_move(
        &mut self,
        gesture: MoveGesture,
        mode: BrushMode,
        options: BrushOptions,
    ) -> Result<Option<ChangeSet>> {
        match gesture.finish(mode, options) {
            Some(action) => self.apply_action(action).map(Some),
            None => Ok(None),
        }
    }

    /// Deletes the selected features as one undoable step.
    pub fn delete_selected(&mut self) -> Result<ChangeSet> {
        let ids = self.store.selected_ids().to_vec();
        if ids.is_empty() {
            return Ok(ChangeSet::default());
        }
        self.apply_action(Action::remove(ids))
    }

    /// Changes the active brush color as an undoable step.
    pub fn set_brush_color(&mut self, color: impl Into<String>) -> Result<()> {
        let color = color.into();
        if color == self.store.brush_color() {
            return Ok(());
        }
        self.apply_action(Action::SetBrushColor { color })?;
        Ok(())
    }

    pub fn brush_color(&self) -> &str {
        self.store.brush_color()
    }

    pub fn get_visible_features(&self, bbox: &BBox) -> Vec<&Feature> {
        self.store.get_visible_features(bbox)
    }

    pub fn get_feature_ids_by_position(&self, point: Position) -> Vec<FeatureId> {
        self.store.get_feature_ids_by_position(point)
    }

    pub fn get_selected_feature(&self) -> Option<&Feature> {
        self.store.get_selected_feature()
    }

    pub fn selected_ids(&self) -> &[FeatureId] {
        self.store.selected_ids()
    }

    pub fn select(&mut self, id: &FeatureId, multi: bool) -> Result<()> {
        self.store.select(id, multi)
    }

    pub fn toggle_selection(&mut self, id: &FeatureId) -> Result<bool> {
        self.store.toggle_selection(id)
    }

    pub fn select_at(&mut self, point: Position, multi: bool) -> Option<FeatureId> {
        self.store.select_at(point, multi)
    }

    pub fn deselect_all(&mut self) {
        self.store.deselect_all();
    }

    pub fn select_all(&mut self) {
        self.store.select_all();
    }

    /// Starts over with an empty painting and no history.
    pub fn new_painting(&mut self) {
        self.store.clear();
        self.history.clear();
        self.name = "Untitled".to_string();
        self.current_file_path = None;
        self.is_modified = false;
        self.created = None;
    }

    /// Name for title bars, with a marker for unsaved changes.
    pub fn display_name(&self) -> String {
        if self.is_modified {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl Default for PaintDocument {
    fn default() -> Self {
        Self::new()
    }
}
