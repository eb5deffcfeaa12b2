use geo::{Coord, LineString, MultiPolygon, Polygon, Translate};
use rstar::RTree;

use crate::geom::{BoundingBox, IndexedBox};

/// Spatial index over the bounding boxes of a list of geometries.
#[derive(Debug, Clone)]
pub(crate) struct FeatureIndex {
    rtree: RTree<IndexedBox>,
}

impl FeatureIndex {
    /// Construct an index from per-feature bounding boxes. Features without
    /// a box (empty geometries) are left out and can never be candidates.
    pub(crate) fn new(boxes: &[Option<BoundingBox>]) -> Self {
        Self {
            rtree: RTree::bulk_load(
                boxes.iter().enumerate()
                    .filter_map(|(i, bbox)| bbox.map(|bbox| IndexedBox::new(i, bbox)))
                    .collect()
            ),
        }
    }

    /// Indices of features whose boxes intersect `bbox`, in ascending order.
    pub(crate) fn candidates(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut hits: Vec<usize> = self.rtree
            .locate_in_envelope_intersecting(&bbox.envelope())
            .map(|b| b.idx())
            .collect();
        hits.sort_unstable();
        hits
    }
}

/// Axis-aligned square of `half_span` degrees around (lat, lng).
pub fn square_around(lat: f64, lng: f64, half_span: f64) -> MultiPolygon<f64> {
    let ring = LineString(vec![
        Coord { x: lng - half_span, y: lat - half_span },
        Coord { x: lng + half_span, y: lat - half_span },
        Coord { x: lng + half_span, y: lat + half_span },
        Coord { x: lng - half_span, y: lat + half_span },
        Coord { x: lng - half_span, y: lat - half_span },
    ]);
    MultiPolygon(vec![Polygon::new(ring, vec![])])
}

/// Copy of `geometry` translated so that its bounding-box center lands on (lat, lng).
/// Returns `None` for an empty geometry.
pub fn centered_at(geometry: &MultiPolygon<f64>, lat: f64, lng: f64) -> Option<MultiPolygon<f64>> {
    let center = BoundingBox::of(geometry)?.center();
    Some(geometry.translate(lng - center.x(), lat - center.y()))
}

/// Merge several geometries into one MultiPolygon (no dissolve, polygons are concatenated).
pub fn merge<'a>(geoms: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> MultiPolygon<f64> {
    MultiPolygon(geoms.into_iter().flat_map(|mp| mp.0.iter().cloned()).collect())
}
