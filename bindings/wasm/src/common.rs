use anyhow::{anyhow, Result};
use districtquiz_core::{CityTable, Scorer};
use wasm_bindgen::JsValue;

pub(crate) fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Quiz errors carry a player-facing message; use it instead of the technical one.
pub(crate) fn quiz_err(e: districtquiz_core::QuizError) -> JsValue {
    JsValue::from_str(&e.user_message())
}

pub(crate) fn parse_strategy(strategy: Option<String>) -> Result<Scorer> {
    let name = strategy.as_deref().unwrap_or("overlap");
    Scorer::from_str(name).ok_or_else(|| {
        anyhow!("Unknown strategy {:?}. Expected one of: overlap, distance", name)
    })
}

/// City table from an optional JSON string, defaulting to the built-in table.
pub(crate) fn parse_table(cities_json: Option<String>) -> Result<CityTable> {
    match cities_json {
        Some(json) => CityTable::from_json(json.as_bytes()),
        None => Ok(CityTable::builtin()),
    }
}

/// Serialize through a JSON string and parse on the JS side.
pub(crate) fn to_js_json(value: &impl serde::Serialize) -> Result<JsValue, JsValue> {
    let json_string = serde_json::to_string(value)
        .map_err(|e| js_err(format!("Failed to serialize to JSON: {e}")))?;
    js_sys::JSON::parse(&json_string)
        .map_err(|e| js_err(format!("Failed to parse JSON string: {e:?}")))
}
