//! # PaintKit Store
//!
//! The vector feature store behind the painting canvas. It keeps the
//! committed set of painted polygon features, answers spatial queries at
//! interactive speed, resolves each brush stroke into boolean operations
//! against what is already painted, and provides undo/redo by replaying a
//! log of actions.
//!
//! ## Core Components
//!
//! - **Feature Store**: collection of features plus its R-tree index, kept in
//!   lockstep by staged commits
//! - **Boolean Ops**: union, difference and intersection via `csgrs`
//! - **Actions & History**: serializable actions, replay-based undo/redo with
//!   optional checkpoints and depth limit
//! - **Brush Adapter**: stroke outline to feature and action
//! - **Selection & Gestures**: view-side selection and drag state
//! - **Document**: facade tying the above together, with file save/load
//!
//! ## Architecture
//!
//! ```text
//! PaintDocument
//!   ├── BrushAdapter ──► Action
//!   ├── ActionLog (undo/redo, replay)
//!   └── FeatureStore
//!         ├── SpatialIndex (broad phase)
//!         ├── ops (boolean operations)
//!         └── SelectionManager
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paintkit_store::{BrushMode, BrushOptions, PaintDocument};
//! use paintkit_core::Position;
//!
//! let mut doc = PaintDocument::new();
//! let outline = vec![
//!     Position::new(0.0, 0.0),
//!     Position::new(10.0, 0.0),
//!     Position::new(10.0, 10.0),
//! ];
//! doc.commit_stroke(&outline, BrushMode::Add, BrushOptions::default())?;
//! doc.undo()?;
//! ```

pub mod action;
pub mod brush;
pub mod document;
pub mod feature;
pub mod gesture;
pub mod history;
pub mod ops;
pub mod selection_manager;
pub mod serialization;
pub mod spatial_index;
pub mod store;

pub use action::{Action, BrushOptions};
pub use brush::BrushAdapter;
pub use document::PaintDocument;
pub use feature::{BrushMode, Feature, FeatureProperties, DEFAULT_BRUSH_COLOR};
pub use gesture::MoveGesture;
pub use history::{ActionLog, HistoryConfig};
pub use ops::{
    apply_difference, apply_intersection, apply_union, BooleanOp, DifferenceOutcome,
    UnionOutcome,
};
pub use selection_manager::SelectionManager;
pub use serialization::{HistoryRecord, PaintingFile, PaintingMetadata};
pub use spatial_index::{SpatialIndex, SpatialIndexStats};
pub use store::{ChangeSet, FeatureStore, HitTestMode, StoreOptions, StoreSnapshot};
