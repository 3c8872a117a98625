//! Painted features and brush modes.

use paintkit_core::{compute_bbox, BBox, FeatureId, GeometryError, PolygonGeometry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Color used when nothing else has been chosen.
pub const DEFAULT_BRUSH_COLOR: &str = "#000000";

/// Boolean set operation a stroke performs against existing features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    /// Merge the stroke into the features it overlaps
    Add,
    /// Carve the stroke out of the features it overlaps
    Subtract,
    /// Keep only the overlap between the stroke and each feature
    Intersect,
}

impl Default for BrushMode {
    fn default() -> Self {
        Self::Add
    }
}

impl fmt::Display for BrushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Subtract => write!(f, "subtract"),
            Self::Intersect => write!(f, "intersect"),
        }
    }
}

impl FromStr for BrushMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" | "union" => Ok(Self::Add),
            "subtract" | "difference" => Ok(Self::Subtract),
            "intersect" | "intersection" => Ok(Self::Intersect),
            _ => Err(format!("Unknown brush mode: {}", s)),
        }
    }
}

/// Properties carried by a feature.
///
/// `is_selected` is a transient view flag: it is never serialized and is
/// ignored by equality, so committed state compares equal regardless of
/// what the user currently has selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub color: String,
    #[serde(skip)]
    pub is_selected: bool,
    /// Host-defined properties, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FeatureProperties {
    pub fn with_color(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            is_selected: false,
            extra: BTreeMap::new(),
        }
    }

    /// Copy with the selection flag cleared, for features derived from this one.
    pub fn committed(&self) -> Self {
        Self {
            color: self.color.clone(),
            is_selected: false,
            extra: self.extra.clone(),
        }
    }
}

impl Default for FeatureProperties {
    fn default() -> Self {
        Self::with_color(DEFAULT_BRUSH_COLOR)
    }
}

impl PartialEq for FeatureProperties {
    fn eq(&self, other: &Self) -> bool {
        self.color == other.color && self.extra == other.extra
    }
}

/// One committed painted polygon region.
///
/// Features are values: the geometry is never edited while a feature sits
/// in the store, and the bounding box is always derived from the geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FeatureRecord")]
pub struct Feature {
    id: FeatureId,
    geometry: PolygonGeometry,
    bbox: BBox,
    properties: FeatureProperties,
}

/// Wire form of a feature; any stored bbox is ignored and recomputed.
#[derive(Deserialize)]
struct FeatureRecord {
    id: FeatureId,
    geometry: PolygonGeometry,
    #[serde(default)]
    properties: FeatureProperties,
}

impl From<FeatureRecord> for Feature {
    fn from(record: FeatureRecord) -> Self {
        Feature::new(record.id, record.geometry, record.properties)
    }
}

impl Feature {
    /// Creates a feature, computing its bounding box.
    pub fn new(id: FeatureId, geometry: PolygonGeometry, properties: FeatureProperties) -> Self {
        let bbox = compute_bbox(&geometry);
        Self {
            id,
            geometry,
            bbox,
            properties,
        }
    }

    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    pub fn geometry(&self) -> &PolygonGeometry {
        &self.geometry
    }

    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    pub fn properties(&self) -> &FeatureProperties {
        &self.properties
    }

    pub fn color(&self) -> &str {
        &self.properties.color
    }

    pub fn is_selected(&self) -> bool {
        self.properties.is_selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.properties.is_selected = selected;
    }

    /// Same id and properties, new geometry.
    pub fn with_geometry(&self, geometry: PolygonGeometry) -> Feature {
        Feature::new(self.id.clone(), geometry, self.properties.committed())
    }

    /// Same geometry and properties, new id.
    pub fn with_id(&self, id: FeatureId) -> Feature {
        Feature {
            id,
            geometry: self.geometry.clone(),
            bbox: self.bbox,
            properties: self.properties.committed(),
        }
    }

    /// Copy moved by `(dx, dy)`, keeping its id.
    pub fn translated(&self, dx: f64, dy: f64) -> Result<Feature, GeometryError> {
        Ok(self.with_geometry(self.geometry.translated(dx, dy)?))
    }
}
