use geo::{BoundingRect, Coord, MultiPolygon, Point, Rect};
use rstar::{RTreeObject, AABB};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in decimal degrees (latitude on y, longitude on x).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self { min_lat, max_lat, min_lng, max_lng }
    }

    /// Bounding box over every ring of every polygon, or `None` for an empty geometry.
    pub fn of(geometry: &MultiPolygon<f64>) -> Option<Self> {
        geometry.bounding_rect().map(Self::from)
    }

    /// Latitude span in degrees.
    #[inline] pub fn height(&self) -> f64 { self.max_lat - self.min_lat }

    /// Longitude span in degrees.
    #[inline] pub fn width(&self) -> f64 { self.max_lng - self.min_lng }

    /// Planar area in square degrees.
    #[inline] pub fn area(&self) -> f64 { self.height() * self.width() }

    /// True when the box collapses to a line or a point.
    #[inline] pub fn is_degenerate(&self) -> bool { self.area() <= 0.0 }

    /// Midpoint of the box as a (lng, lat) point.
    pub fn center(&self) -> Point<f64> {
        Point::new(
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Intersection with another box. Boxes that are disjoint or only share
    /// an edge or a corner have no intersection.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let min_lat = self.min_lat.max(other.min_lat);
        let max_lat = self.max_lat.min(other.max_lat);
        let min_lng = self.min_lng.max(other.min_lng);
        let max_lng = self.max_lng.min(other.max_lng);

        if min_lat >= max_lat || min_lng >= max_lng {
            return None;
        }

        Some(BoundingBox { min_lat, max_lat, min_lng, max_lng })
    }

    /// Area of the intersection box, 0 if the boxes do not overlap.
    #[inline]
    pub fn overlap_area(&self, other: &BoundingBox) -> f64 {
        self.intersection(other).map_or(0.0, |b| b.area())
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }

    pub(crate) fn envelope(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        }
    }
}

impl From<BoundingBox> for Rect<f64> {
    fn from(bbox: BoundingBox) -> Self {
        Rect::new(
            Coord { x: bbox.min_lng, y: bbox.min_lat },
            Coord { x: bbox.max_lng, y: bbox.max_lat },
        )
    }
}

/// A bounding box in an R-tree, associated with a reference feature by index.
#[derive(Debug, Clone)]
pub(crate) struct IndexedBox {
    idx: usize, // Index of corresponding feature
    bbox: BoundingBox,
}

impl IndexedBox {
    pub(crate) fn new(idx: usize, bbox: BoundingBox) -> Self {
        Self { idx, bbox }
    }

    /// Get the index of the corresponding feature.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for IndexedBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { self.bbox.envelope() }
}

#[cfg(test)]
mod tests {
    use super::BoundingBox;

    fn austin() -> BoundingBox { BoundingBox::new(30.0, 30.1, -97.8, -97.7) }

    #[test]
    fn identical_boxes_overlap_fully() {
        let a = austin();
        let overlap = a.overlap_area(&a);
        assert!((overlap - a.area()).abs() < 1e-12);
    }

    #[test]
    fn edge_contact_is_not_overlap() {
        let a = austin();
        let b = BoundingBox::new(30.1, 30.2, -97.8, -97.7);
        assert!(a.intersection(&b).is_none());
        assert_eq!(a.overlap_area(&b), 0.0);
    }

    #[test]
    fn disjoint_boxes_have_no_intersection() {
        let a = austin();
        let b = BoundingBox::new(31.0, 31.1, -97.8, -97.7);
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn collinear_box_is_degenerate() {
        let line = BoundingBox::new(30.0, 30.0, -97.8, -97.7);
        assert!(line.is_degenerate());
        assert!(!austin().is_degenerate());
    }

    #[test]
    fn center_is_midpoint() {
        let c = austin().center();
        assert!((c.y() - 30.05).abs() < 1e-12);
        assert!((c.x() + 97.75).abs() < 1e-12);
    }

    #[test]
    fn union_covers_both() {
        let a = austin();
        let b = BoundingBox::new(29.5, 29.9, -98.0, -97.9);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(29.5, 30.1, -98.0, -97.7));
    }
}
