#![doc = "districtquiz public API"]
mod district;
mod geom;
mod io;
mod quiz;
mod score;

#[doc(inline)]
pub use district::{Feature, ReferenceDistrict, ReferenceOrigin, ShapeId, UserShape, FALLBACK_HALF_SPAN};

#[doc(inline)]
pub use geom::{centered_at, merge, square_around, BoundingBox};

#[doc(inline)]
pub use io::geojson::{read_features, write_features, GeoFeature};

#[doc(inline)]
pub use io::source::{CachedSource, DiskSource, MemSource, ReferenceSource};

#[cfg(feature = "download")]
#[doc(inline)]
pub use io::source::HttpSource;

#[doc(inline)]
pub use quiz::{CityConfig, CityTable, LoadError, QuizError, QuizRegistry, QuizSession, QuizState, REVEAL_MS};

#[doc(inline)]
pub use score::{
    haversine_distance, overlap_percentage, Attempt, BoundsOverlapScorer, CentroidDistanceScorer, DistanceScore,
    FeatureMatch, FeatureScore, Grade, ScoreResult, Scorer, Tier, EARTH_RADIUS_METERS, MATCH_THRESHOLD,
    METERS_PER_MILE,
};
