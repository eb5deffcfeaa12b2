use geo::{Distance, HaversineMeasure, MultiPolygon, Point};

use crate::district::{ReferenceDistrict, ShapeId, UserShape};
use crate::geom::BoundingBox;
use crate::score::{Attempt, Grade, ScoreResult, Tier};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Display conversion factor.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Great-circle distance in meters between two (lng, lat) points.
pub fn haversine_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    HaversineMeasure::new(EARTH_RADIUS_METERS).distance(a, b)
}

/// Distance between bounding-box centers and its tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceScore {
    pub distance_meters: f64,
    pub tier: Tier,
}

impl DistanceScore {
    #[inline] pub fn distance_miles(&self) -> f64 { self.distance_meters / METERS_PER_MILE }
}

/// Grades placements by the distance between bounding-box centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentroidDistanceScorer {
    near_meters: f64,
    far_meters: f64,
}

impl Default for CentroidDistanceScorer {
    fn default() -> Self { Self { near_meters: 5_000.0, far_meters: 10_000.0 } }
}

impl CentroidDistanceScorer {
    /// Custom tier limits; `near_meters` must not exceed `far_meters`.
    pub fn new(near_meters: f64, far_meters: f64) -> Self {
        assert!(near_meters <= far_meters,
            "CentroidDistanceScorer::new: near ({near_meters}) must not exceed far ({far_meters})");
        Self { near_meters, far_meters }
    }

    /// Tier for a distance. Each limit belongs to the lower tier.
    pub fn tier(&self, distance_meters: f64) -> Tier {
        if distance_meters < self.near_meters {
            Tier::High
        } else if distance_meters < self.far_meters {
            Tier::Medium
        } else {
            Tier::Low
        }
    }

    /// Distance between the box centers of `user` and `reference`.
    /// `None` if either geometry is empty.
    pub fn score(&self, user: &MultiPolygon<f64>, reference: &MultiPolygon<f64>) -> Option<DistanceScore> {
        let user = BoundingBox::of(user)?;
        let reference = BoundingBox::of(reference)?;
        Some(self.score_boxes(&user, &reference))
    }

    fn score_boxes(&self, user: &BoundingBox, reference: &BoundingBox) -> DistanceScore {
        let distance_meters = haversine_distance(user.center(), reference.center());
        DistanceScore { distance_meters, tier: self.tier(distance_meters) }
    }

    /// Grade all shapes against the center of the whole reference district.
    /// The closest shape wins; empty shapes are skipped. Returns `None` when no
    /// shape has coordinates.
    pub fn grade(&self, shapes: &[(ShapeId, &UserShape)], reference: &ReferenceDistrict) -> Option<Grade> {
        let mut attempts = Vec::with_capacity(shapes.len());
        let mut best: Option<(ShapeId, DistanceScore)> = None;

        for &(id, shape) in shapes {
            let Some(bounds) = shape.bounds() else { continue };
            let score = self.score_boxes(bounds, reference.bounds());
            tracing::debug!(shape = id.0, meters = score.distance_meters, tier = %score.tier, "distance score");

            attempts.push(Attempt {
                shape: id,
                metric_value: score.distance_meters,
                matched: score.tier == Tier::High,
                feature: None,
            });
            if best.is_none_or(|(_, b)| score.distance_meters < b.distance_meters) {
                best = Some((id, score));
            }
        }

        let (shape, score) = best?;
        let meters = score.distance_meters.round();
        let message = match score.tier {
            Tier::High => format!(
                "Great job! Your district placement is very close to the actual {} boundaries. \
                 Distance from correct position: {meters}m ({:.1} mi)",
                reference.name(), score.distance_miles(),
            ),
            Tier::Medium => format!(
                "Close! Your district placement is near the correct area but needs some adjustment. \
                 Distance from correct position: {meters}m ({:.1} mi)",
                score.distance_miles(),
            ),
            Tier::Low => "Not quite right. Try repositioning your district closer to the correct area. \
                          The correct boundaries were shown briefly."
                .to_string(),
        };

        Some(Grade::new(
            ScoreResult {
                matched: score.tier == Tier::High,
                metric_value: score.distance_meters,
                tier: score.tier,
                message,
            },
            shape,
            None,
            attempts,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::square_around;

    #[test]
    fn austin_example_is_high() {
        let d = haversine_distance(Point::new(-97.7431, 30.2672), Point::new(-97.75, 30.26));
        assert!(d > 500.0 && d < 5_000.0, "unexpected distance {d}");
        assert_eq!(CentroidDistanceScorer::default().tier(d), Tier::High);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let d = haversine_distance(Point::new(0.0, 0.0), Point::new(0.0, 1.0));
        assert!((d - 111_194.93).abs() < 1.0, "unexpected distance {d}");
        assert_eq!(haversine_distance(Point::new(-97.0, 30.0), Point::new(-97.0, 30.0)), 0.0);
    }

    #[test]
    fn tier_boundaries_belong_to_lower_tier() {
        let s = CentroidDistanceScorer::default();
        assert_eq!(s.tier(0.0), Tier::High);
        assert_eq!(s.tier(4_999.999), Tier::High);
        assert_eq!(s.tier(5_000.0), Tier::Medium);
        assert_eq!(s.tier(9_999.999), Tier::Medium);
        assert_eq!(s.tier(10_000.0), Tier::Low);
        assert_eq!(s.tier(1.0e7), Tier::Low);
    }

    #[test]
    fn tier_is_monotonic() {
        let s = CentroidDistanceScorer::default();
        let mut last = Tier::High;
        for step in 0..300 {
            let tier = s.tier(step as f64 * 50.0);
            assert!(tier >= last, "tier improved at {}", step * 50);
            last = tier;
        }
    }

    #[test]
    fn closest_shape_wins() {
        let reference = ReferenceDistrict::fallback("District 37", 30.2672, -97.7431);
        let far = UserShape::new(square_around(31.0, -97.7431, 0.05));
        let near = UserShape::new(square_around(30.26, -97.75, 0.05));
        let empty = UserShape::new(MultiPolygon(vec![]));
        let shapes = [(ShapeId(3), &far), (ShapeId(4), &empty), (ShapeId(7), &near)];

        let grade = CentroidDistanceScorer::default().grade(&shapes, &reference).unwrap();
        assert_eq!(grade.shape, ShapeId(7));
        assert_eq!(grade.total, 2);
        assert_eq!(grade.correct, 1);
        assert_eq!(grade.result.tier, Tier::High);
        assert!(grade.result.matched);
        assert!(grade.result.message.contains("District 37"));
    }

    #[test]
    fn equal_distance_keeps_first_shape() {
        let reference = ReferenceDistrict::fallback("District 37", 30.2672, -97.7431);
        let north = UserShape::new(square_around(30.30, -97.7431, 0.05));
        let twin = UserShape::new(square_around(30.30, -97.7431, 0.05));
        let shapes = [(ShapeId(2), &north), (ShapeId(5), &twin)];

        let grade = CentroidDistanceScorer::default().grade(&shapes, &reference).unwrap();
        assert_eq!(grade.shape, ShapeId(2));
        assert_eq!(grade.attempts[0].metric_value, grade.attempts[1].metric_value);
    }

    #[test]
    fn far_placement_is_low() {
        let reference = ReferenceDistrict::fallback("District 9", 29.7604, -95.3698);
        let shape = UserShape::new(square_around(32.7767, -96.7970, 0.05));
        let grade = CentroidDistanceScorer::default()
            .grade(&[(ShapeId(0), &shape)], &reference)
            .unwrap();
        assert_eq!(grade.result.tier, Tier::Low);
        assert!(!grade.result.matched);
        assert!(grade.result.metric_value > 10_000.0);
    }

    #[test]
    fn only_empty_shapes_yield_none() {
        let reference = ReferenceDistrict::fallback("x", 0.0, 0.0);
        let empty = UserShape::new(MultiPolygon(vec![]));
        assert!(CentroidDistanceScorer::default().grade(&[(ShapeId(0), &empty)], &reference).is_none());
    }
}
