//! Undo/redo by replaying the action log.
//!
//! Boolean subtraction throws geometry away, so actions cannot be inverted.
//! Instead the log keeps every applied action and undo rebuilds the store
//! from a known state by replaying the actions that remain.
//!
//! Two optional bounds keep replay cheap on long sessions:
//! - `checkpoint_interval`: every K actions a snapshot of the store is kept,
//!   and undo replays only from the newest snapshot at or before the new head.
//! - `max_depth`: once the undo stack grows past it, the oldest action is
//!   folded into the log's base snapshot and can no longer be undone.

use paintkit_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::action::Action;
use crate::store::{ChangeSet, FeatureStore, StoreSnapshot};

/// Limits for the action log. Both default to off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undoable actions.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Take a snapshot every this many actions.
    #[serde(default)]
    pub checkpoint_interval: Option<usize>,
}

/// Applied and undone actions, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    undo_stack: Vec<Action>,
    redo_stack: Vec<Action>,
    /// State the undo stack replays on top of; `None` is an empty store.
    base: Option<StoreSnapshot>,
    /// Store state after the first `n` actions of the undo stack.
    checkpoints: BTreeMap<usize, StoreSnapshot>,
    config: HistoryConfig,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Rebuilds a log from persisted parts. Call [`rebuild`](Self::rebuild)
    /// afterwards to bring a store in line with it.
    pub fn from_parts(
        base: Option<StoreSnapshot>,
        undo_stack: Vec<Action>,
        config: HistoryConfig,
    ) -> Self {
        Self {
            undo_stack,
            redo_stack: Vec::new(),
            base,
            checkpoints: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn undo_stack(&self) -> &[Action] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[Action] {
        &self.redo_stack
    }

    pub fn base(&self) -> Option<&StoreSnapshot> {
        self.base.as_ref()
    }

    /// Number of stored checkpoints.
    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    /// Applies `action` to `store` and records it. Clears the redo stack.
    ///
    /// # Errors
    ///
    /// Propagates the store's error; a failed action is not recorded.
    pub fn apply(&mut self, store: &mut FeatureStore, action: Action) -> Result<ChangeSet> {
        let changes = store.apply(&action)?;
        debug!(action = action.name(), depth = self.undo_stack.len() + 1, "action applied");
        self.undo_stack.push(action);
        self.redo_stack.clear();
        self.after_push(store);
        Ok(changes)
    }

    /// Undoes the last action. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, store: &mut FeatureStore) -> Result<bool> {
        let Some(action) = self.undo_stack.pop() else {
            return Ok(false);
        };
        debug!(action = action.name(), "undo");
        self.redo_stack.push(action);
        let head = self.undo_stack.len();
        self.checkpoints.retain(|&n, _| n <= head);
        self.rebuild(store)?;
        Ok(true)
    }

    /// Re-applies the last undone action. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, store: &mut FeatureStore) -> Result<bool> {
        let Some(action) = self.redo_stack.pop() else {
            return Ok(false);
        };
        match store.apply(&action) {
            Ok(_) => {
                debug!(action = action.name(), "redo");
                self.undo_stack.push(action);
                self.after_push(store);
                Ok(true)
            }
            Err(err) => {
                self.redo_stack.push(action);
                Err(err)
            }
        }
    }

    /// Resets `store` to the log's base state and replays the undo stack,
    /// starting from the newest usable checkpoint.
    pub fn rebuild(&mut self, store: &mut FeatureStore) -> Result<()> {
        let head = self.undo_stack.len();
        let start = match self.checkpoints.range(..=head).next_back() {
            Some((&n, snapshot)) => {
                store.restore(snapshot);
                n
            }
            None => {
                match &self.base {
                    Some(base) => store.restore(base),
                    None => store.reset(),
                }
                0
            }
        };

        for (offset, action) in self.undo_stack[start..].iter().enumerate() {
            store.apply(action)?;
            let applied = start + offset + 1;
            if self.is_checkpoint(applied) && !self.checkpoints.contains_key(&applied) {
                self.checkpoints.insert(applied, store.snapshot());
            }
        }
        store.sync_selection();
        debug!(from = start, replayed = head - start, "store rebuilt");

        self.enforce_depth(store);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forgets all history. The store is left as it is.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.base = None;
        self.checkpoints.clear();
    }

    fn is_checkpoint(&self, applied: usize) -> bool {
        matches!(self.config.checkpoint_interval, Some(k) if k > 0 && applied % k == 0)
    }

    fn after_push(&mut self, store: &FeatureStore) {
        let head = self.undo_stack.len();
        if self.is_checkpoint(head) {
            self.checkpoints.insert(head, store.snapshot());
        }
        self.enforce_depth(store);
    }

    fn enforce_depth(&mut self, store: &FeatureStore) {
        let Some(max) = self.config.max_depth else {
            return;
        };
        while self.undo_stack.len() > max {
            self.fold_oldest(store);
        }
    }

    /// Moves the oldest undoable action into the base snapshot.
    fn fold_oldest(&mut self, store: &FeatureStore) {
        let oldest = self.undo_stack.remove(0);
        let base = match self.checkpoints.get(&1) {
            Some(snapshot) => snapshot.clone(),
            None => {
                let mut scratch = FeatureStore::with_options(store.options().clone());
                if let Some(base) = &self.base {
                    scratch.restore(base);
                }
                if let Err(err) = scratch.apply(&oldest) {
                    warn!(%err, action = oldest.name(), "folding action into base failed");
                }
                scratch.snapshot()
            }
        };
        self.base = Some(base);
        self.checkpoints = std::mem::take(&mut self.checkpoints)
            .into_iter()
            .filter(|(n, _)| *n > 1)
            .map(|(n, snapshot)| (n - 1, snapshot))
            .collect();
        debug!(action = oldest.name(), "oldest action folded into base");
    }
}
