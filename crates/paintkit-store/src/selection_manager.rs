use paintkit_core::FeatureId;

/// Tracks which features the user has selected.
///
/// `SelectionManager` only holds ids; it never touches the features. The
/// [`FeatureStore`](crate::store::FeatureStore) keeps each feature's
/// `is_selected` flag in step with this list.
///
/// # Selection Model
///
/// - **Ordered**: ids are kept in the order they were selected
/// - **Primary Selection**: the most recently selected id
/// - **Multi-select**: adding to the selection instead of replacing it
///
/// Selection is view state. It is not recorded in the action history and is
/// pruned whenever the ids it refers to leave the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionManager {
    selected: Vec<FeatureId>,
}

impl SelectionManager {
    /// Creates a new `SelectionManager` with no selection.
    ///
    /// # Examples
    ///
    /// ```
    /// use paintkit_store::selection_manager::SelectionManager;
    ///
    /// let manager = SelectionManager::new();
    /// assert_eq!(manager.primary(), None);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids, oldest first.
    pub fn selected_ids(&self) -> &[FeatureId] {
        &self.selected
    }

    /// Returns the primary (most recently selected) id.
    pub fn primary(&self) -> Option<&FeatureId> {
        self.selected.last()
    }

    pub fn is_selected(&self, id: &FeatureId) -> bool {
        self.selected.contains(id)
    }

    /// Selects `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - The feature to select
    /// * `multi` - If `true`, keeps the current selection and makes `id` primary;
    ///   otherwise `id` becomes the only selected feature
    ///
    /// # Returns
    ///
    /// The ids that were deselected as a side effect.
    pub fn select(&mut self, id: FeatureId, multi: bool) -> Vec<FeatureId> {
        let mut dropped = Vec::new();
        if multi {
            self.selected.retain(|s| s != &id);
        } else {
            dropped = self.selected.drain(..).filter(|s| s != &id).collect();
        }
        self.selected.push(id);
        dropped
    }

    /// Flips the selection state of `id` without touching other ids.
    ///
    /// # Returns
    ///
    /// `true` if `id` is selected afterwards.
    pub fn toggle(&mut self, id: FeatureId) -> bool {
        if self.deselect(&id) {
            false
        } else {
            self.selected.push(id);
            true
        }
    }

    /// Removes `id` from the selection. Returns `false` if it was not selected.
    pub fn deselect(&mut self, id: &FeatureId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s != id);
        self.selected.len() != before
    }

    /// Clears the selection, returning what was selected.
    pub fn clear(&mut self) -> Vec<FeatureId> {
        std::mem::take(&mut self.selected)
    }

    /// Replaces the selection with `ids`, in order.
    pub fn set(&mut self, ids: impl IntoIterator<Item = FeatureId>) {
        self.selected.clear();
        for id in ids {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
    }

    /// Drops every id for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(&FeatureId) -> bool) {
        self.selected.retain(|id| keep(id));
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
