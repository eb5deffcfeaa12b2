//! Grading strategies for user guesses.
//!
//! Two strategies exist and neither is authoritative: the drawing pages grade
//! by bounding-box overlap, the drag-and-drop page by distance between
//! bounding-box centers. A deployment picks one through [`Scorer`].

mod distance;
mod overlap;

use std::fmt;

use serde::Serialize;

use crate::district::{ReferenceDistrict, ShapeId, UserShape};

pub use distance::{haversine_distance, CentroidDistanceScorer, DistanceScore, EARTH_RADIUS_METERS, METERS_PER_MILE};
pub use overlap::{overlap_percentage, BoundsOverlapScorer, FeatureScore, MATCH_THRESHOLD};

/// Coarse closeness classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        })
    }
}

/// Verdict for the best user shape against the best reference feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub matched: bool,
    /// Overlap percentage or distance in meters, depending on the strategy.
    pub metric_value: f64,
    pub tier: Tier,
    pub message: String,
}

/// Score of a single shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attempt {
    pub shape: ShapeId,
    pub metric_value: f64,
    pub matched: bool,
    /// Best reference feature, when the strategy scores features individually.
    pub feature: Option<usize>,
}

/// Reference feature a result was measured against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureMatch {
    pub index: usize,
    pub label: String,
}

/// Outcome of one grading request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub result: ScoreResult,
    /// Shape the result was derived from.
    pub shape: ShapeId,
    pub feature: Option<FeatureMatch>,
    pub attempts: Vec<Attempt>,
    pub correct: usize,
    pub total: usize,
    /// How long a UI should show the reference before hiding it again.
    pub reveal_ms: Option<u64>,
    /// Free text shown alongside the verdict.
    pub commentary: Option<String>,
}

impl Grade {
    pub(crate) fn new(result: ScoreResult, shape: ShapeId, feature: Option<FeatureMatch>, attempts: Vec<Attempt>) -> Self {
        Self {
            correct: attempts.iter().filter(|a| a.matched).count(),
            total: attempts.len(),
            result,
            shape,
            feature,
            attempts,
            reveal_ms: None,
            commentary: None,
        }
    }

    /// Share of shapes that matched, rounded to a whole percent.
    pub fn percent_correct(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.correct as f64 / self.total as f64 * 100.0).round() as u32
    }

    /// One-line tally, e.g. "Score: 1/2 correct (50%)".
    pub fn summary(&self) -> String {
        format!("Score: {}/{} correct ({}%)", self.correct, self.total, self.percent_correct())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ScorerKind {
    BoundsOverlap(BoundsOverlapScorer),
    CentroidDistance(CentroidDistanceScorer),
}

/// A configured grading strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scorer {
    kind: ScorerKind,
}

impl Scorer {
    /// Bounding-box overlap with the default 70% match threshold.
    pub fn bounds_overlap() -> Self {
        Self { kind: ScorerKind::BoundsOverlap(BoundsOverlapScorer::default()) }
    }

    /// Center distance with the default 5 km / 10 km tiers.
    pub fn centroid_distance() -> Self {
        Self { kind: ScorerKind::CentroidDistance(CentroidDistanceScorer::default()) }
    }

    /// Parse a strategy name: "overlap" / "bounds-overlap" or "distance" / "centroid-distance".
    pub fn from_str(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "overlap" | "bounds-overlap" | "bounds_overlap" => Some(Self::bounds_overlap()),
            "distance" | "centroid-distance" | "centroid_distance" => Some(Self::centroid_distance()),
            _ => None,
        }
    }

    /// Short name of the strategy.
    pub fn name(&self) -> &'static str {
        match self.kind {
            ScorerKind::BoundsOverlap(_) => "overlap",
            ScorerKind::CentroidDistance(_) => "distance",
        }
    }

    /// Grade `shapes` against `reference`. `None` when no shape could be scored.
    pub fn grade(&self, shapes: &[(ShapeId, &UserShape)], reference: &ReferenceDistrict) -> Option<Grade> {
        match &self.kind {
            ScorerKind::BoundsOverlap(s) => s.grade(shapes, reference),
            ScorerKind::CentroidDistance(s) => s.grade(shapes, reference),
        }
    }
}

impl From<BoundsOverlapScorer> for Scorer {
    fn from(s: BoundsOverlapScorer) -> Self { Self { kind: ScorerKind::BoundsOverlap(s) } }
}

impl From<CentroidDistanceScorer> for Scorer {
    fn from(s: CentroidDistanceScorer) -> Self { Self { kind: ScorerKind::CentroidDistance(s) } }
}

impl fmt::Display for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ScorerKind::BoundsOverlap(s) => write!(f, "overlap(threshold={}%)", s.threshold()),
            ScorerKind::CentroidDistance(_) => write!(f, "distance"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strategy_names() {
        assert_eq!(Scorer::from_str("overlap").map(|s| s.name()), Some("overlap"));
        assert_eq!(Scorer::from_str("Centroid-Distance").map(|s| s.name()), Some("distance"));
        assert!(Scorer::from_str("area").is_none());
    }

    #[test]
    fn percent_correct_rounds() {
        let result = ScoreResult { matched: true, metric_value: 80.0, tier: Tier::High, message: String::new() };
        let attempts = vec![
            Attempt { shape: ShapeId(0), metric_value: 80.0, matched: true, feature: Some(0) },
            Attempt { shape: ShapeId(1), metric_value: 10.0, matched: false, feature: Some(0) },
            Attempt { shape: ShapeId(2), metric_value: 20.0, matched: false, feature: None },
        ];
        let grade = Grade::new(result, ShapeId(0), None, attempts);
        assert_eq!(grade.percent_correct(), 33);
        assert_eq!(grade.summary(), "Score: 1/3 correct (33%)");
    }

    #[test]
    fn tiers_order_from_best_to_worst() {
        assert!(Tier::High < Tier::Medium && Tier::Medium < Tier::Low);
        assert_eq!(Tier::Medium.to_string(), "medium");
    }
}
