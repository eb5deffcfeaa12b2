use geo::MultiPolygon;

use crate::district::{ReferenceDistrict, ShapeId, UserShape};
use crate::geom::BoundingBox;
use crate::score::{Attempt, FeatureMatch, Grade, ScoreResult, Tier};

/// Percentage above which a guess counts as a match.
pub const MATCH_THRESHOLD: f64 = 70.0;

/// Share of the user box (in percent) covered by the reference box.
///
/// Returns 0 when the boxes don't intersect, and 0 when the user box has zero
/// area, so the result always lies in [0, 100].
pub fn overlap_percentage(user: &BoundingBox, reference: &BoundingBox) -> f64 {
    let user_area = user.area();
    if user_area <= 0.0 {
        return 0.0;
    }
    (user.overlap_area(reference) / user_area * 100.0).clamp(0.0, 100.0)
}

/// Best feature for a single shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureScore {
    /// Index of the best-scoring feature, `None` when every feature scores 0.
    pub feature: Option<usize>,
    pub percentage: f64,
    pub matched: bool,
}

/// Grades guesses by how much of the user's bounding box falls inside the
/// reference bounding box. A coarse heuristic: concave or L-shaped districts
/// are over-counted, and polygon topology is never checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsOverlapScorer {
    threshold: f64,
}

impl Default for BoundsOverlapScorer {
    fn default() -> Self { Self { threshold: MATCH_THRESHOLD } }
}

impl BoundsOverlapScorer {
    pub fn new(threshold: f64) -> Self { Self { threshold } }

    #[inline] pub fn threshold(&self) -> f64 { self.threshold }

    /// Overlap percentage of `user` against `reference`, both taken as a whole.
    pub fn score(&self, user: &MultiPolygon<f64>, reference: &MultiPolygon<f64>) -> f64 {
        match (BoundingBox::of(user), BoundingBox::of(reference)) {
            (Some(u), Some(r)) => overlap_percentage(&u, &r),
            _ => 0.0,
        }
    }

    /// Compare one shape against every reference feature, keeping the best.
    /// Ties keep the earlier feature.
    pub fn best_match(&self, shape: &UserShape, reference: &ReferenceDistrict) -> FeatureScore {
        let mut best = FeatureScore { feature: None, percentage: 0.0, matched: false };
        let Some(user) = shape.bounds() else { return best };

        for idx in reference.candidates(user) {
            let Some(bounds) = reference.features()[idx].bounds() else { continue };
            let percentage = overlap_percentage(user, bounds);
            if percentage > best.percentage {
                best = FeatureScore { feature: Some(idx), percentage, matched: percentage > self.threshold };
            }
        }

        best
    }

    /// Tier for an overlap percentage.
    pub fn tier(&self, percentage: f64) -> Tier {
        if percentage > self.threshold {
            Tier::High
        } else if percentage > 0.0 {
            Tier::Medium
        } else {
            Tier::Low
        }
    }

    /// Grade all shapes; the best-overlapping shape determines the result.
    /// Returns `None` when `shapes` is empty.
    pub fn grade(&self, shapes: &[(ShapeId, &UserShape)], reference: &ReferenceDistrict) -> Option<Grade> {
        let mut attempts = Vec::with_capacity(shapes.len());
        let mut best: Option<(ShapeId, FeatureScore)> = None;

        for &(id, shape) in shapes {
            let score = self.best_match(shape, reference);
            tracing::debug!(shape = id.0, percentage = score.percentage, feature = ?score.feature, "overlap score");

            attempts.push(Attempt {
                shape: id,
                metric_value: score.percentage,
                matched: score.matched,
                feature: score.feature,
            });
            if best.is_none_or(|(_, b)| score.percentage > b.percentage) {
                best = Some((id, score));
            }
        }

        let (shape, score) = best?;
        let feature = score.feature.map(|index| FeatureMatch {
            index,
            label: reference.feature_label(index).to_string(),
        });

        let message = match (&feature, score.matched) {
            (Some(f), true) => format!("Correct! {:.1}% match with {}", score.percentage, f.label),
            (Some(f), false) => format!("Not quite right. Best match: {:.1}% with {}", score.percentage, f.label),
            (None, _) => "Not quite right. Your shape does not overlap any district.".to_string(),
        };

        Some(Grade::new(
            ScoreResult {
                matched: score.matched,
                metric_value: score.percentage,
                tier: self.tier(score.percentage),
                message,
            },
            shape,
            feature,
            attempts,
        ))
    }
}
