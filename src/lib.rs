//! # PaintKit
//!
//! A vector painting engine. Brush strokes arrive as closed outlines and are
//! resolved into boolean set operations (add, subtract, intersect) against a
//! spatially indexed collection of painted polygons, with undo/redo by
//! deterministic replay of an action log.
//!
//! ## Architecture
//!
//! PaintKit is organized as a workspace with multiple crates:
//!
//! 1. **paintkit-core** - Geometry, bounding boxes, feature ids, error types
//! 2. **paintkit-store** - Spatial index, boolean ops, feature store, action log, document facade
//! 3. **paintkit-settings** - Configuration files
//! 4. **paintkit** - Logging setup and the replay command line tool

pub mod cli;

pub use paintkit_core::{
    bbox_center, compute_bbox, BBox, Error, FeatureId, GeometryError, PolygonGeometry, Position,
    Result, StoreError,
};
pub use paintkit_settings::{Config, LoggingSettings};
pub use paintkit_store::{
    Action, ActionLog, BrushAdapter, BrushMode, BrushOptions, ChangeSet, Feature, FeatureStore,
    HistoryConfig, HitTestMode, MoveGesture, PaintDocument, PaintingFile, StoreOptions,
    DEFAULT_BRUSH_COLOR,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting on stderr
/// - RUST_LOG environment variable support, INFO otherwise
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(&LoggingSettings::default())
}

/// Initialize logging from the `logging` config section
///
/// `RUST_LOG` takes precedence over the configured level. With `json` set,
/// events are written as JSON lines instead of the pretty format.
pub fn init_logging_with(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.level.to_lowercase()))?;

    let (pretty_layer, json_layer) = if settings.json {
        let layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);
        (None, Some(layer))
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
            .pretty();
        (Some(layer), None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty_layer)
        .with(json_layer)
        .try_init()?;

    Ok(())
}
