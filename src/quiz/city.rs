use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Per-city quiz configuration. One generic session consumes any entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityConfig {
    /// Lookup key, e.g. "austin".
    pub key: String,
    pub name: String,
    /// Map center as [lat, lng].
    pub center: [f64; 2],
    pub zoom: u8,
    /// District number being guessed.
    pub district: String,
    /// Current district boundary, shown before guessing.
    pub current_district_file: String,
    /// Proposed district boundary, the one guesses are graded against.
    pub proposed_district_file: String,
    /// Commentary shown after checking.
    #[serde(default)]
    pub results_text: String,
}

impl CityConfig {
    #[inline] pub fn lat(&self) -> f64 { self.center[0] }

    #[inline] pub fn lng(&self) -> f64 { self.center[1] }

    /// Display name of the graded district, e.g. "District 37".
    pub fn district_name(&self) -> String { format!("District {}", self.district) }
}

/// Table of cities keyed by `CityConfig::key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityTable {
    cities: Vec<CityConfig>,
}

impl CityTable {
    /// Build a table, rejecting duplicate keys.
    pub fn new(cities: Vec<CityConfig>) -> Result<Self> {
        for (i, city) in cities.iter().enumerate() {
            if cities[..i].iter().any(|c| c.key == city.key) {
                bail!("Duplicate city key {:?}", city.key);
            }
        }
        Ok(Self { cities })
    }

    /// Parse a JSON array of city entries.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let cities: Vec<CityConfig> = serde_json::from_slice(bytes).context("Failed to parse city table")?;
        Self::new(cities)
    }

    /// The Texas congressional districts the quiz ships with.
    pub fn builtin() -> Self {
        Self { cities: builtin_cities() }
    }

    pub fn get(&self, key: &str) -> Option<&CityConfig> {
        self.cities.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CityConfig> { self.cities.iter() }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.cities.iter().map(|c| c.key.as_str()) }

    #[inline] pub fn len(&self) -> usize { self.cities.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.cities.is_empty() }
}

impl Default for CityTable {
    fn default() -> Self { Self::builtin() }
}

fn city(
    key: &str, name: &str, center: [f64; 2], zoom: u8, district: &str, dir: &str, results_text: &str,
) -> CityConfig {
    CityConfig {
        key: key.to_string(),
        name: name.to_string(),
        center,
        zoom,
        district: district.to_string(),
        current_district_file: format!("cities/{dir}/district-{district}.geojson"),
        proposed_district_file: format!("cities/{dir}/proposed-{district}.json"),
        results_text: results_text.to_string(),
    }
}

fn builtin_cities() -> Vec<CityConfig> {
    vec![
        city("dallas", "Dallas", [32.7767, -96.7970], 10, "32", "dallas",
            "Also targeted are Democratic U.S. Reps. Julie Johnson of Farmers Branch, whose Dallas-anchored \
             district would be reshaped to favor Republicans, and Marc Veasey of Fort Worth, whose nearby \
             district would remain solidly blue but drop all of Fort Worth, Veasey's hometown and political base."),
        city("austin", "Austin", [30.266666, -97.733330], 10, "37", "austin",
            "The map's newly proposed GOP seat in Central Texas also triggers the prospect of Austin Democratic \
             Reps. Casar and Lloyd Doggett facing each other in a primary for the area's lone remaining blue district."),
        city("houston", "Houston", [29.7604, -95.3698], 10, "9", "houston",
            "Houston's District 9 redistricting proposal aims to reshape the political landscape in Harris County."),
        city("sanantonio", "San Antonio", [29.4241, -98.4936], 8, "35", "san-antonio",
            "San Antonio's District 35 faces significant boundary changes under the proposed redistricting plan."),
        city("southtexas", "South Texas", [27.7694, -98.2300], 7, "28", "san-antonio",
            "The proposed changes to South Texas' District 28 aim to better reflect the region's demographics \
             and political landscape."),
    ]
}
