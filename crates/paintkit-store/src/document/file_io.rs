//! File I/O operations (save, load) for painting documents.

use anyhow::Context;
use std::path::Path;
use tracing::{info, warn};

use super::PaintDocument;
use crate::history::ActionLog;
use crate::serialization::PaintingFile;
use crate::store::FeatureStore;

impl PaintDocument {
    /// Save painting to file.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let history = self.save_history.then_some(&self.history);
        let mut file = PaintingFile::capture(&self.name, &self.store, history);
        if let Some(created) = self.created {
            file.metadata.created = created;
        }
        file.save_to_file(&path)?;

        info!(
            path = %path.as_ref().display(),
            features = file.features.len(),
            "painting saved"
        );
        self.created = Some(file.metadata.created);
        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Load painting from file.
    ///
    /// When the file carries history it is replayed so undo keeps working;
    /// if the replay disagrees with the saved features the replayed state is
    /// kept and a warning is logged. The document is untouched on error.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let file = PaintingFile::load_from_file(&path)?;

        let mut store = FeatureStore::with_options(self.store.options().clone());
        let config = *self.history.config();
        let history = match file.history.clone() {
            Some(record) => {
                let mut log = ActionLog::from_parts(record.base, record.undo_stack, config);
                log.rebuild(&mut store)
                    .context("Failed to replay painting history")?;

                let mut saved = file.snapshot();
                saved.features.sort_by(|a, b| a.id().cmp(b.id()));
                if store.snapshot() != saved {
                    warn!(
                        path = %path.as_ref().display(),
                        saved = saved.features.len(),
                        replayed = store.len(),
                        "replayed history does not match saved features, keeping replayed state"
                    );
                }
                log
            }
            None => {
                store.restore(&file.snapshot());
                ActionLog::with_config(config)
            }
        };

        info!(
            path = %path.as_ref().display(),
            features = store.len(),
            undo_depth = history.undo_depth(),
            "painting loaded"
        );
        self.store = store;
        self.history = history;
        self.name = file.metadata.name;
        self.created = Some(file.metadata.created);
        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.is_modified = false;
        Ok(())
    }
}
