//! Format-specific reading and writing.
//!
//! - `geojson` - GeoJSON FeatureCollections for reference districts and user shapes
//! - `source` - byte sources that reference files are fetched from

pub(crate) mod geojson;
pub(crate) mod source;
