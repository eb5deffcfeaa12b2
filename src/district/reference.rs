use anyhow::{bail, Result};
use geo::MultiPolygon;
use serde::Serialize;

use crate::geom::{merge, square_around, BoundingBox, FeatureIndex};
use crate::io::geojson::{read_features, write_features, GeoFeature};

/// Half-width in degrees of the synthetic square used when a reference fails to load.
pub const FALLBACK_HALF_SPAN: f64 = 0.05;

/// One polygonal feature of a reference district file.
#[derive(Debug, Clone)]
pub struct Feature {
    label: Option<String>,
    geometry: MultiPolygon<f64>,
    bounds: Option<BoundingBox>,
}

impl Feature {
    pub fn new(label: Option<String>, geometry: MultiPolygon<f64>) -> Self {
        Self { label, bounds: BoundingBox::of(&geometry), geometry }
    }

    #[inline] pub fn label(&self) -> Option<&str> { self.label.as_deref() }

    #[inline] pub fn geometry(&self) -> &MultiPolygon<f64> { &self.geometry }

    #[inline] pub fn bounds(&self) -> Option<&BoundingBox> { self.bounds.as_ref() }
}

impl From<GeoFeature> for Feature {
    fn from(f: GeoFeature) -> Self { Feature::new(f.label, f.geometry) }
}

/// Where a reference district's geometry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceOrigin {
    /// Read from a reference file.
    Loaded,
    /// Synthetic square substituted after a failed load.
    Fallback,
}

/// The authoritative boundary a guess is graded against. Immutable once built.
#[derive(Debug, Clone)]
pub struct ReferenceDistrict {
    name: String,
    features: Vec<Feature>,
    bounds: BoundingBox,
    index: FeatureIndex,
    origin: ReferenceOrigin,
}

impl ReferenceDistrict {
    /// Build a reference from its features. Fails if no feature has any coordinates.
    pub fn new(name: impl Into<String>, features: Vec<Feature>) -> Result<Self> {
        Self::with_origin(name.into(), features, ReferenceOrigin::Loaded)
    }

    /// Parse a reference from GeoJSON bytes.
    pub fn from_geojson(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let features = read_features(bytes)?.into_iter().map(Feature::from).collect();
        Self::new(name, features)
    }

    /// Deterministic square of ±0.05° around (lat, lng), used for degraded grading.
    pub fn fallback(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        let name = name.into();
        let feature = Feature::new(Some(name.clone()), square_around(lat, lng, FALLBACK_HALF_SPAN));
        let bounds = feature.bounds
            .unwrap_or_else(|| BoundingBox::new(lat, lat, lng, lng));
        let index = FeatureIndex::new(&[feature.bounds]);
        Self { name, features: vec![feature], bounds, index, origin: ReferenceOrigin::Fallback }
    }

    fn with_origin(name: String, features: Vec<Feature>, origin: ReferenceOrigin) -> Result<Self> {
        let Some(bounds) = features.iter()
            .filter_map(|f| f.bounds)
            .reduce(|a, b| a.union(&b))
        else {
            bail!("Reference district {name:?} has no polygon coordinates");
        };

        let boxes: Vec<Option<BoundingBox>> = features.iter().map(|f| f.bounds).collect();
        Ok(Self { name, index: FeatureIndex::new(&boxes), features, bounds, origin })
    }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn features(&self) -> &[Feature] { &self.features }

    /// Bounding box over all features.
    #[inline] pub fn bounds(&self) -> &BoundingBox { &self.bounds }

    #[inline] pub fn origin(&self) -> ReferenceOrigin { self.origin }

    #[inline] pub fn is_fallback(&self) -> bool { self.origin == ReferenceOrigin::Fallback }

    /// Label of feature `idx`, falling back to the district name.
    pub fn feature_label(&self, idx: usize) -> &str {
        self.features.get(idx).and_then(Feature::label).unwrap_or(&self.name)
    }

    /// All features merged into a single MultiPolygon.
    pub fn merged(&self) -> MultiPolygon<f64> {
        merge(self.features.iter().map(Feature::geometry))
    }

    /// Indices of features whose bounding boxes touch `bbox`, in feature order.
    pub(crate) fn candidates(&self, bbox: &BoundingBox) -> Vec<usize> {
        self.index.candidates(bbox)
    }

    /// Serialize the reference as a GeoJSON FeatureCollection, e.g. to reveal it in a UI.
    pub fn to_geojson(&self) -> Result<Vec<u8>> {
        write_features(self.features.iter().map(|f| (f.label(), f.geometry())))
    }
}
