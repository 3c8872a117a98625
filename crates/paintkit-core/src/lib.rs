//! # PaintKit Core
//!
//! Core types shared by the PaintKit crates:
//! geometry primitives and bounding boxes, feature identifiers, and the
//! error taxonomy used by the feature store.

pub mod error;
pub mod geometry;
pub mod ids;

pub use error::{Error, GeometryError, Result, StoreError};
pub use geometry::{bbox_center, compute_bbox, BBox, PolygonGeometry, Position};
pub use ids::{FeatureId, IdGenerator, SequentialIdGenerator, UuidIdGenerator};
