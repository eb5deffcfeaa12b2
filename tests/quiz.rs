// End-to-end quiz flow: reference files on disk, drawn and dropped shapes,
// both grading strategies, fallback on missing references, clear and regrade.

use std::path::Path;

use districtquiz::{
    CachedSource, CityTable, DiskSource, QuizError, QuizRegistry, QuizState, ReferenceOrigin, Scorer, Tier,
    UserShape,
};

const PROPOSED_37: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "District": "37", "name": "Proposed District 37" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-97.8, 30.0], [-97.7, 30.0], [-97.7, 30.1], [-97.8, 30.1], [-97.8, 30.0]]]
            }
        },
        {
            "type": "Feature",
            "properties": { "District": "10" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-97.6, 30.0], [-97.5, 30.0], [-97.5, 30.1], [-97.6, 30.1], [-97.6, 30.0]]]
            }
        }
    ]
}"#;

fn square(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> String {
    format!(
        r#"{{"type": "Polygon", "coordinates": [[[{min_lng}, {min_lat}], [{max_lng}, {min_lat}], [{max_lng}, {max_lat}], [{min_lng}, {max_lat}], [{min_lng}, {min_lat}]]]}}"#
    )
}

fn write_reference(root: &Path) {
    let dir = root.join("cities/austin");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("proposed-37.json"), PROPOSED_37).unwrap();
}

#[test]
fn overlap_quiz_round() {
    let data = tempfile::tempdir().unwrap();
    write_reference(data.path());
    let source = DiskSource::new(data.path());

    let mut registry = QuizRegistry::new(CityTable::builtin(), Scorer::bounds_overlap());
    let session = registry.open_loaded("austin", &source).unwrap();
    assert_eq!(session.state(), QuizState::Ready);
    assert!(!session.is_degraded());
    assert_eq!(session.reference().unwrap().features().len(), 2);

    assert_eq!(session.check().unwrap_err(), QuizError::NoInput);
    assert_eq!(session.state(), QuizState::Ready);

    // Same box as the reference feature: full match.
    let exact = UserShape::from_geojson(square(-97.8, 30.0, -97.7, 30.1).as_bytes()).unwrap();
    session.submit_shape(exact).unwrap();
    // Half of this box hangs west of the district.
    let half = UserShape::from_geojson(square(-97.85, 30.0, -97.75, 30.1).as_bytes()).unwrap();
    session.submit_shape(half).unwrap();

    let grade = session.check().unwrap();
    assert!(grade.result.matched);
    assert_eq!(grade.result.tier, Tier::High);
    assert!((grade.result.metric_value - 100.0).abs() < 1e-9);
    assert_eq!(grade.feature.as_ref().unwrap().label, "37");
    assert_eq!((grade.correct, grade.total), (1, 2));
    assert!((grade.attempts[1].metric_value - 50.0).abs() < 1e-9);
    assert_eq!(session.state(), QuizState::Graded);

    session.clear();
    assert_eq!(session.state(), QuizState::Ready);
    assert_eq!(session.check().unwrap_err(), QuizError::NoInput);
}

#[test]
fn shape_between_districts_matches_neither() {
    let data = tempfile::tempdir().unwrap();
    write_reference(data.path());

    let mut registry = QuizRegistry::new(CityTable::builtin(), Scorer::bounds_overlap());
    let session = registry.open_loaded("austin", &DiskSource::new(data.path())).unwrap();

    // Straddles both features; a sixth of the box lies over each.
    let straddle = UserShape::from_geojson(square(-97.725, 30.0, -97.575, 30.1).as_bytes()).unwrap();
    session.submit_shape(straddle).unwrap();

    let grade = session.check().unwrap();
    assert!(!grade.result.matched);
    assert_eq!(grade.result.tier, Tier::Medium);
    assert!(grade.result.message.starts_with("Not quite right."));
}

#[test]
fn dropped_district_graded_by_distance() {
    let data = tempfile::tempdir().unwrap();
    write_reference(data.path());
    let source = CachedSource::new(DiskSource::new(data.path()));

    let mut registry = QuizRegistry::new(CityTable::builtin(), Scorer::centroid_distance());
    let session = registry.open_loaded("austin", &source).unwrap();

    // Reference spans -97.8..-97.5, 30.0..30.1; its center is (30.05, -97.65).
    session.drop_shape(30.06, -97.66).unwrap();
    let grade = session.check().unwrap();
    assert_eq!(grade.result.tier, Tier::High);
    assert!(grade.result.metric_value < 5_000.0);

    session.clear();
    session.drop_shape(30.05, -97.55).unwrap(); // about 9.6 km east
    let grade = session.check().unwrap();
    assert_eq!(grade.result.tier, Tier::Medium);

    session.clear();
    session.drop_shape(30.5, -97.65).unwrap();
    let grade = session.check().unwrap();
    assert_eq!(grade.result.tier, Tier::Low);
    assert!(!grade.result.matched);
}

#[test]
fn missing_reference_grades_against_fallback() {
    let data = tempfile::tempdir().unwrap();

    let mut registry = QuizRegistry::new(CityTable::builtin(), Scorer::bounds_overlap());
    let session = registry.open_loaded("houston", &DiskSource::new(data.path())).unwrap();
    assert!(session.is_degraded());
    assert_eq!(session.reference().unwrap().origin(), ReferenceOrigin::Fallback);
    assert!(session.load_error().is_some());

    // Houston center is (29.7604, -95.3698); the fallback square is ±0.05°.
    let guess = UserShape::from_geojson(square(-95.40, 29.73, -95.34, 29.79).as_bytes()).unwrap();
    session.submit_shape(guess).unwrap();
    assert!(session.check().unwrap().result.matched);
}
