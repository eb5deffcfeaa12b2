use std::fmt;

use anyhow::{bail, Result};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::district::ReferenceDistrict;
use crate::geom::{centered_at, merge, BoundingBox};
use crate::io::geojson::read_features;

/// Identifier of a user shape within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u32);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeId({})", self.0)
    }
}

/// A guess drawn or dropped by the user.
#[derive(Debug, Clone)]
pub struct UserShape {
    geometry: MultiPolygon<f64>,
    bounds: Option<BoundingBox>,
}

impl UserShape {
    pub fn new(geometry: MultiPolygon<f64>) -> Self {
        Self { bounds: BoundingBox::of(&geometry), geometry }
    }

    /// Parse a user shape from GeoJSON. All polygonal features are combined into one shape.
    pub fn from_geojson(bytes: &[u8]) -> Result<Self> {
        let features = read_features(bytes)?;
        if features.is_empty() {
            bail!("GeoJSON contains no Polygon or MultiPolygon features");
        }
        Ok(Self::new(merge(features.iter().map(|f| &f.geometry))))
    }

    /// A copy of `template` moved so its bounding-box center sits on the drop point.
    pub fn dropped_at(template: &ReferenceDistrict, lat: f64, lng: f64) -> Option<Self> {
        centered_at(&template.merged(), lat, lng).map(Self::new)
    }

    #[inline] pub fn geometry(&self) -> &MultiPolygon<f64> { &self.geometry }

    /// Bounding box, or `None` when the shape has no coordinates.
    #[inline] pub fn bounds(&self) -> Option<&BoundingBox> { self.bounds.as_ref() }

    /// True when the shape has no coordinates at all.
    #[inline] pub fn is_empty(&self) -> bool { self.bounds.is_none() }
}
