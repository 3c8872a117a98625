//! Error handling for PaintKit
//!
//! Provides the error types for the geometry and feature-store layers:
//! - Geometry errors (malformed rings, non-finite coordinates)
//! - Store errors (precondition violations against the feature collection)
//!
//! Expected absences (removing an unknown id, querying an empty region) are
//! not errors and never surface here. All error types use `thiserror`.

use thiserror::Error;

use crate::ids::FeatureId;

/// Geometry error type
///
/// Raised when a polygon does not satisfy the ring invariants. Producers of
/// geometry (the hull/simplify stage, deserialization) must reject these
/// before anything reaches the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The polygon has no rings at all
    #[error("Polygon has no rings")]
    Empty,

    /// A ring has fewer than four points (three distinct plus the closing point)
    #[error("Ring {ring_index} has {points} points, at least 4 are required")]
    RingTooShort {
        /// Index of the offending ring (0 is the outer boundary).
        ring_index: usize,
        /// Number of points the ring carried.
        points: usize,
    },

    /// A ring does not end on its first point
    #[error("Ring {ring_index} is not closed")]
    RingNotClosed {
        /// Index of the offending ring.
        ring_index: usize,
    },

    /// A ring has fewer than three distinct points or encloses no area
    #[error("Ring {ring_index} is degenerate (collinear or repeated points)")]
    Degenerate {
        /// Index of the offending ring.
        ring_index: usize,
    },

    /// A coordinate is NaN or infinite
    #[error("Ring {ring_index} has a non-finite coordinate at point {point_index}")]
    NonFiniteCoordinate {
        /// Index of the offending ring.
        ring_index: usize,
        /// Index of the offending point within the ring.
        point_index: usize,
    },
}

/// Feature store error type
///
/// Precondition violations detected before a mutation is committed. When one
/// of these is returned the store has not been modified.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A feature the caller asserted exists is missing
    #[error("Feature not found: {id}")]
    FeatureNotFound {
        /// The missing feature id.
        id: FeatureId,
    },

    /// A new feature would reuse the id of a feature that stays in the collection
    #[error("Feature id already in use: {id}")]
    DuplicateFeature {
        /// The colliding feature id.
        id: FeatureId,
    },

    /// A move translation is NaN or infinite
    #[error("Invalid translation ({dx}, {dy})")]
    InvalidTranslation {
        /// Horizontal component.
        dx: f64,
        /// Vertical component.
        dy: f64,
    },

    /// The collection and the spatial index disagree
    #[error("Spatial index out of sync: {reason}")]
    IndexOutOfSync {
        /// Description of the mismatch.
        reason: String,
    },
}

/// Main error type for PaintKit
///
/// A unified error type that can represent any error from the core layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }

    /// Check if this is a store error
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
