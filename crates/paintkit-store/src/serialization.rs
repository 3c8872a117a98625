//! Serialization and deserialization for painting files.
//!
//! A painting file is JSON holding the committed features and, optionally,
//! the action history needed to keep undo working after a reload.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::action::Action;
use crate::feature::{Feature, DEFAULT_BRUSH_COLOR};
use crate::history::ActionLog;
use crate::store::{FeatureStore, StoreSnapshot};

/// Painting file format version
const FILE_FORMAT_VERSION: &str = "1.0";

/// Complete painting file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaintingFile {
    pub version: String,
    pub metadata: PaintingMetadata,
    #[serde(default = "default_brush_color")]
    pub brush_color: String,
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryRecord>,
}

/// Painting metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaintingMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Undo history as stored on disk. The redo stack is not kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub base: Option<StoreSnapshot>,
    pub undo_stack: Vec<Action>,
}

fn default_brush_color() -> String {
    DEFAULT_BRUSH_COLOR.to_string()
}

impl PaintingFile {
    /// Create a new, empty painting file
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: PaintingMetadata {
                name: name.into(),
                created: now,
                modified: now,
            },
            brush_color: default_brush_color(),
            features: Vec::new(),
            history: None,
        }
    }

    /// Captures the committed state of `store` and, if given, its history.
    pub fn capture(name: impl Into<String>, store: &FeatureStore, log: Option<&ActionLog>) -> Self {
        let snapshot = store.snapshot();
        let mut file = Self::new(name);
        file.brush_color = snapshot.brush_color;
        file.features = snapshot.features;
        file.history = log.map(|log| HistoryRecord {
            base: log.base().cloned(),
            undo_stack: log.undo_stack().to_vec(),
        });
        file
    }

    /// Committed state recorded in the file.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            features: self.features.clone(),
            brush_color: self.brush_color.clone(),
        }
    }

    /// Save painting to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize painting")?;

        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write painting file {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Load painting from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read painting file {}", path.as_ref().display()))?;

        serde_json::from_str(&content).context("Failed to parse painting file")
    }
}
