use districtquiz_core::{LoadError, QuizSession, ShapeId, UserShape};
use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use crate::common::*;

/// One city's quiz, driven by the page's buttons and map events.
#[wasm_bindgen]
pub struct WasmQuiz {
    inner: QuizSession,
}

#[wasm_bindgen]
impl WasmQuiz {
    /// Construct a quiz for `city` ("dallas", "austin", ...).
    /// strategy: "overlap" (default) or "distance".
    /// cities_json: optional JSON city table replacing the built-in one.
    #[wasm_bindgen(constructor)]
    pub fn new(city: String, strategy: Option<String>, cities_json: Option<String>) -> Result<WasmQuiz, JsValue> {
        let scorer = parse_strategy(strategy).map_err(js_err)?;
        let table = parse_table(cities_json).map_err(js_err)?;
        let config = table.get(&city)
            .ok_or_else(|| js_err(format!("Unknown city {city:?}")))?
            .clone();
        Ok(WasmQuiz { inner: QuizSession::new(config, scorer) })
    }

    /// Start loading; returns the reference path the page should fetch.
    pub fn begin_loading(&mut self) -> Result<String, JsValue> {
        self.inner.begin_loading().map(str::to_string).map_err(quiz_err)
    }

    /// Hand over the fetched reference GeoJSON. Returns "loaded" or "fallback".
    pub fn load_reference(&mut self, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let origin = self.inner.finish_loading_bytes(bytes).map_err(quiz_err)?;
        serde_wasm_bindgen::to_value(&origin).map_err(js_err)
    }

    /// Report a failed fetch; the quiz continues on a fallback square.
    pub fn load_failed(&mut self, reason: String) -> Result<(), JsValue> {
        let file = self.inner.city().proposed_district_file.clone();
        self.inner.finish_loading(Err(LoadError::new(file, reason))).map_err(quiz_err)?;
        Ok(())
    }

    /// Add a drawn shape (GeoJSON object or string). Returns its id.
    pub fn submit_shape(&mut self, geojson: JsValue) -> Result<u32, JsValue> {
        let text = match geojson.as_string() {
            Some(s) => s,
            None => String::from(js_sys::JSON::stringify(&geojson)?),
        };
        let shape = UserShape::from_geojson(text.as_bytes()).map_err(js_err)?;
        self.inner.submit_shape(shape).map(|id| id.0).map_err(quiz_err)
    }

    /// Add a copy of the district centered where it was dropped. Returns its id.
    pub fn drop_shape(&mut self, lat: f64, lng: f64) -> Result<u32, JsValue> {
        self.inner.drop_shape(lat, lng).map(|id| id.0).map_err(quiz_err)
    }

    pub fn remove_shape(&mut self, id: u32) -> Result<(), JsValue> {
        self.inner.remove_shape(ShapeId(id)).map(|_| ()).map_err(quiz_err)
    }

    /// Grade the current shapes. Returns the grade as a JS object.
    pub fn check(&mut self) -> Result<JsValue, JsValue> {
        let grade = self.inner.check().map_err(quiz_err)?;
        to_js_json(grade)
    }

    /// Remove all shapes and the last grade.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Current state: "uninitialized", "reference_loading", "ready" or "graded".
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.state()).map_err(js_err)
    }

    /// True while grading against the fallback square.
    pub fn is_degraded(&self) -> bool {
        self.inner.is_degraded()
    }

    pub fn shape_count(&self) -> u32 {
        self.inner.shape_count() as u32
    }

    /// Reference district as a GeoJSON object, to reveal the answer.
    pub fn reference_geojson(&self) -> Result<JsValue, JsValue> {
        let reference = self.inner.reference()
            .ok_or_else(|| quiz_err(districtquiz_core::QuizError::ReferenceUnavailable))?;
        let bytes = reference.to_geojson().map_err(js_err)?;
        let text = String::from_utf8(bytes).map_err(js_err)?;
        js_sys::JSON::parse(&text)
    }
}
