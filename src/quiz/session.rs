use serde::Serialize;

use crate::district::{ReferenceDistrict, ReferenceOrigin, ShapeId, UserShape};
use crate::io::source::ReferenceSource;
use crate::quiz::{CityConfig, LoadError, QuizError};
use crate::score::{Grade, Scorer};

/// How long a UI should reveal the reference after grading.
pub const REVEAL_MS: u64 = 3_000;

/// Lifecycle of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    Uninitialized,
    ReferenceLoading,
    Ready,
    Graded,
}

/// One city's quiz: its reference district, the user's shapes and the last grade.
///
/// Reference retrieval is split in two so the caller can perform the I/O
/// however it likes (browser fetch, disk, HTTP): [`begin_loading`] names the
/// file to fetch and [`finish_loading`] hands back the outcome. A failed load
/// substitutes a square around the city center so grading still works.
///
/// [`begin_loading`]: QuizSession::begin_loading
/// [`finish_loading`]: QuizSession::finish_loading
#[derive(Debug, Clone)]
pub struct QuizSession {
    city: CityConfig,
    scorer: Scorer,
    state: QuizState,
    reference: Option<ReferenceDistrict>,
    load_error: Option<LoadError>,
    shapes: Vec<(ShapeId, UserShape)>,
    next_id: u32,
    last_grade: Option<Grade>,
}

impl QuizSession {
    pub fn new(city: CityConfig, scorer: Scorer) -> Self {
        Self {
            city,
            scorer,
            state: QuizState::Uninitialized,
            reference: None,
            load_error: None,
            shapes: Vec::new(),
            next_id: 0,
            last_grade: None,
        }
    }

    #[inline] pub fn state(&self) -> QuizState { self.state }

    #[inline] pub fn city(&self) -> &CityConfig { &self.city }

    #[inline] pub fn scorer(&self) -> &Scorer { &self.scorer }

    /// Reference district, if loaded (or substituted).
    #[inline] pub fn reference(&self) -> Option<&ReferenceDistrict> { self.reference.as_ref() }

    /// Error from the last failed load, kept while the fallback is in use.
    #[inline] pub fn load_error(&self) -> Option<&LoadError> { self.load_error.as_ref() }

    /// True when grading against the fallback square.
    pub fn is_degraded(&self) -> bool {
        self.reference.as_ref().is_some_and(ReferenceDistrict::is_fallback)
    }

    #[inline] pub fn last_grade(&self) -> Option<&Grade> { self.last_grade.as_ref() }

    #[inline] pub fn shape_count(&self) -> usize { self.shapes.len() }

    pub fn shapes(&self) -> impl Iterator<Item = (ShapeId, &UserShape)> {
        self.shapes.iter().map(|(id, shape)| (*id, shape))
    }

    pub fn shape(&self, id: ShapeId) -> Option<&UserShape> {
        self.shapes.iter().find(|(i, _)| *i == id).map(|(_, s)| s)
    }

    /// Start loading the reference. Returns the file the caller should fetch.
    pub fn begin_loading(&mut self) -> Result<&str, QuizError> {
        if self.state != QuizState::Uninitialized {
            return Err(QuizError::InvalidState("reference loading already started"));
        }
        self.state = QuizState::ReferenceLoading;
        tracing::debug!(city = %self.city.key, file = %self.city.proposed_district_file, "loading reference");
        Ok(self.city.proposed_district_file.as_str())
    }

    /// Finish loading with the fetched reference, or substitute the fallback square on failure.
    pub fn finish_loading(&mut self, outcome: Result<ReferenceDistrict, LoadError>) -> Result<ReferenceOrigin, QuizError> {
        if self.state != QuizState::ReferenceLoading {
            return Err(QuizError::InvalidState("no reference load in progress"));
        }

        let reference = match outcome {
            Ok(reference) => {
                tracing::info!(
                    city = %self.city.key,
                    features = reference.features().len(),
                    "reference district loaded"
                );
                self.load_error = None;
                reference
            }
            Err(err) => {
                tracing::warn!(city = %self.city.key, error = %err, "using fallback reference geometry");
                self.load_error = Some(err);
                ReferenceDistrict::fallback(self.city.district_name(), self.city.lat(), self.city.lng())
            }
        };

        let origin = reference.origin();
        self.reference = Some(reference);
        self.state = QuizState::Ready;
        Ok(origin)
    }

    /// Finish loading from raw GeoJSON bytes.
    pub fn finish_loading_bytes(&mut self, bytes: &[u8]) -> Result<ReferenceOrigin, QuizError> {
        let outcome = ReferenceDistrict::from_geojson(self.city.district_name(), bytes)
            .map_err(|e| LoadError::from_anyhow(&self.city.proposed_district_file, &e));
        self.finish_loading(outcome)
    }

    /// Load the reference synchronously from `source`.
    pub fn load(&mut self, source: &dyn ReferenceSource) -> Result<ReferenceOrigin, QuizError> {
        let file = self.begin_loading()?.to_string();
        let outcome = source.get(&file)
            .and_then(|bytes| ReferenceDistrict::from_geojson(self.city.district_name(), &bytes))
            .map_err(|e| LoadError::from_anyhow(&file, &e));
        self.finish_loading(outcome)
    }

    /// Add a user shape. Shapes without coordinates are rejected.
    /// Any stored grade is discarded since it no longer describes the shapes.
    pub fn submit_shape(&mut self, shape: UserShape) -> Result<ShapeId, QuizError> {
        if shape.is_empty() {
            return Err(QuizError::DegenerateGeometry);
        }
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        self.shapes.push((id, shape));
        self.last_grade = None;
        tracing::debug!(city = %self.city.key, shape = id.0, "shape submitted");
        Ok(id)
    }

    /// Add a copy of the reference district centered on a drop point.
    pub fn drop_shape(&mut self, lat: f64, lng: f64) -> Result<ShapeId, QuizError> {
        let reference = self.reference.as_ref().ok_or(QuizError::ReferenceUnavailable)?;
        let shape = UserShape::dropped_at(reference, lat, lng).ok_or(QuizError::DegenerateGeometry)?;
        self.submit_shape(shape)
    }

    /// Remove a user shape, discarding any stored grade.
    pub fn remove_shape(&mut self, id: ShapeId) -> Result<UserShape, QuizError> {
        let pos = self.shapes.iter().position(|(i, _)| *i == id)
            .ok_or(QuizError::UnknownShape(id))?;
        tracing::debug!(city = %self.city.key, shape = id.0, "shape removed");
        self.last_grade = None;
        Ok(self.shapes.remove(pos).1)
    }

    /// Grade the current shapes. Repeatable; each call recomputes from scratch.
    pub fn check(&mut self) -> Result<&Grade, QuizError> {
        if self.shapes.is_empty() {
            return Err(QuizError::NoInput);
        }
        let reference = self.reference.as_ref().ok_or(QuizError::ReferenceUnavailable)?;

        let shapes: Vec<(ShapeId, &UserShape)> = self.shapes.iter().map(|(id, s)| (*id, s)).collect();
        let mut grade = self.scorer.grade(&shapes, reference).ok_or(QuizError::DegenerateGeometry)?;
        grade.reveal_ms = Some(REVEAL_MS);
        if !self.city.results_text.is_empty() {
            grade.commentary = Some(self.city.results_text.clone());
        }

        tracing::info!(
            city = %self.city.key,
            scorer = self.scorer.name(),
            tier = %grade.result.tier,
            value = grade.result.metric_value,
            degraded = reference.is_fallback(),
            "graded"
        );

        self.state = QuizState::Graded;
        Ok(&*self.last_grade.insert(grade))
    }

    /// Discard all shapes and the last grade. The reference is kept.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.last_grade = None;
        if self.state == QuizState::Graded {
            self.state = QuizState::Ready;
        }
        tracing::debug!(city = %self.city.key, "session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::square_around;
    use crate::quiz::CityTable;

    fn austin() -> QuizSession {
        QuizSession::new(CityTable::builtin().get("austin").unwrap().clone(), Scorer::bounds_overlap())
    }

    fn ready(mut session: QuizSession) -> QuizSession {
        session.begin_loading().unwrap();
        let reference = ReferenceDistrict::fallback("District 37", 30.3, -97.8);
        session.finish_loading(Ok(reference)).unwrap();
        session
    }

    #[test]
    fn loading_walks_through_states() {
        let mut session = austin();
        assert_eq!(session.state(), QuizState::Uninitialized);
        assert_eq!(session.begin_loading().unwrap(), "cities/austin/proposed-37.json");
        assert_eq!(session.state(), QuizState::ReferenceLoading);
        assert!(session.begin_loading().is_err());
        session.finish_loading_bytes(br#"{"type": "Polygon", "coordinates": [[[-97.8, 30.2], [-97.7, 30.2], [-97.7, 30.3], [-97.8, 30.2]]]}"#).unwrap();
        assert_eq!(session.state(), QuizState::Ready);
        assert!(!session.is_degraded());
    }

    #[test]
    fn finish_without_begin_is_rejected() {
        let mut session = austin();
        let reference = ReferenceDistrict::fallback("x", 0.0, 0.0);
        assert!(matches!(session.finish_loading(Ok(reference)), Err(QuizError::InvalidState(_))));
        assert_eq!(session.state(), QuizState::Uninitialized);
    }

    #[test]
    fn failed_load_substitutes_fallback() {
        let mut session = austin();
        session.begin_loading().unwrap();
        let origin = session.finish_loading_bytes(b"<html>404</html>").unwrap();
        assert_eq!(origin, ReferenceOrigin::Fallback);
        assert_eq!(session.state(), QuizState::Ready);
        assert!(session.is_degraded());
        assert_eq!(session.load_error().unwrap().file, "cities/austin/proposed-37.json");

        let center = session.reference().unwrap().bounds().center();
        assert!((center.y() - 30.266666).abs() < 1e-9);
        assert!((center.x() + 97.73333).abs() < 1e-9);
    }

    #[test]
    fn check_without_shapes_leaves_state_alone() {
        let mut session = ready(austin());
        assert_eq!(session.check().unwrap_err(), QuizError::NoInput);
        assert_eq!(session.state(), QuizState::Ready);
        assert!(session.last_grade().is_none());
    }

    #[test]
    fn check_before_reference_is_unavailable() {
        let mut session = austin();
        session.submit_shape(UserShape::new(square_around(30.3, -97.8, 0.05))).unwrap();
        assert_eq!(session.check().unwrap_err(), QuizError::ReferenceUnavailable);
        assert_eq!(session.state(), QuizState::Uninitialized);
    }

    #[test]
    fn check_grades_and_clear_resets() {
        let mut session = ready(austin());
        session.submit_shape(UserShape::new(square_around(30.3, -97.8, 0.04))).unwrap();

        let grade = session.check().unwrap();
        assert!(grade.result.matched);
        assert_eq!(grade.reveal_ms, Some(REVEAL_MS));
        assert!(grade.commentary.as_deref().unwrap().contains("Central Texas"));
        assert_eq!(session.state(), QuizState::Graded);

        // Repeatable from Graded.
        assert!(session.check().is_ok());
        assert_eq!(session.state(), QuizState::Graded);

        session.clear();
        assert_eq!(session.state(), QuizState::Ready);
        assert_eq!(session.shape_count(), 0);
        assert!(session.last_grade().is_none());
        assert_eq!(session.check().unwrap_err(), QuizError::NoInput);
        assert!(session.reference().is_some());
    }

    #[test]
    fn shapes_can_be_removed() {
        let mut session = ready(austin());
        let a = session.submit_shape(UserShape::new(square_around(30.3, -97.8, 0.04))).unwrap();
        let b = session.submit_shape(UserShape::new(square_around(35.0, -90.0, 0.04))).unwrap();
        assert_ne!(a, b);

        session.remove_shape(a).unwrap();
        assert_eq!(session.remove_shape(a).unwrap_err(), QuizError::UnknownShape(a));
        assert!(session.shape(b).is_some());

        let grade = session.check().unwrap();
        assert_eq!(grade.shape, b);
        assert!(!grade.result.matched);
    }

    #[test]
    fn changing_shapes_discards_stored_grade() {
        let mut session = ready(austin());
        let a = session.submit_shape(UserShape::new(square_around(30.3, -97.8, 0.04))).unwrap();
        assert_eq!(session.check().unwrap().shape, a);

        session.remove_shape(a).unwrap();
        assert!(session.last_grade().is_none());

        let b = session.submit_shape(UserShape::new(square_around(30.3, -97.8, 0.04))).unwrap();
        assert_eq!(session.check().unwrap().shape, b);
        session.submit_shape(UserShape::new(square_around(35.0, -90.0, 0.04))).unwrap();
        assert!(session.last_grade().is_none());
    }

    #[test]
    fn empty_shapes_are_rejected() {
        let mut session = ready(austin());
        let empty = UserShape::new(geo::MultiPolygon(vec![]));
        assert_eq!(session.submit_shape(empty).unwrap_err(), QuizError::DegenerateGeometry);
        assert_eq!(session.shape_count(), 0);
    }

    #[test]
    fn dropped_shape_on_target_is_high() {
        let city = CityTable::builtin().get("austin").unwrap().clone();
        let mut session = ready(QuizSession::new(city, Scorer::centroid_distance()));
        assert_eq!(austin().drop_shape(30.3, -97.8).unwrap_err(), QuizError::ReferenceUnavailable);

        session.drop_shape(30.301, -97.801).unwrap();
        let grade = session.check().unwrap();
        assert_eq!(grade.result.tier, crate::score::Tier::High);
    }
}
