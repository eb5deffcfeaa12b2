use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Value};

/// Property keys read as a feature label, in priority order.
const LABEL_KEYS: [&str; 4] = ["District", "district", "name", "id"];

/// A polygonal feature read from GeoJSON.
#[derive(Debug, Clone)]
pub struct GeoFeature {
    pub label: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

/// Read polygonal features from GeoJSON bytes.
///
/// Accepts a FeatureCollection, a single Feature, or a bare Polygon/MultiPolygon
/// geometry. Features with other geometry types (or a null geometry) are skipped.
pub fn read_features(bytes: &[u8]) -> Result<Vec<GeoFeature>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;

    match value["type"].as_str() {
        Some("FeatureCollection") => {
            let features = value["features"].as_array()
                .ok_or_else(|| anyhow!("Invalid FeatureCollection: missing features array"))?;

            let mut out = Vec::with_capacity(features.len());
            for (i, feature) in features.iter().enumerate() {
                if let Some(f) = parse_feature(feature).with_context(|| format!("Invalid feature at index {i}"))? {
                    out.push(f);
                }
            }
            Ok(out)
        }
        Some("Feature") => Ok(parse_feature(&value)?.into_iter().collect()),
        Some("Polygon") | Some("MultiPolygon") => {
            Ok(vec![GeoFeature { label: None, geometry: parse_geometry(&value)? }])
        }
        Some(other) => bail!("Unsupported GeoJSON type: {other}"),
        None => bail!("Invalid GeoJSON: missing \"type\""),
    }
}

/// Parse one Feature object. Returns `Ok(None)` for non-polygonal features.
fn parse_feature(feature: &Value) -> Result<Option<GeoFeature>> {
    let geometry = &feature["geometry"];
    match geometry["type"].as_str() {
        Some("Polygon") | Some("MultiPolygon") => Ok(Some(GeoFeature {
            label: feature_label(&feature["properties"]),
            geometry: parse_geometry(geometry)?,
        })),
        _ => Ok(None),
    }
}

/// Pick the first usable label from a properties object.
fn feature_label(properties: &Value) -> Option<String> {
    LABEL_KEYS.iter().find_map(|key| match &properties[*key] {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Parse a Polygon or MultiPolygon geometry object into a geo::MultiPolygon.
fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("Invalid geometry: missing coordinates"))?;

    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon_coords(coords)?])),
        Some("MultiPolygon") => {
            let polygons = coords.iter()
                .map(|p| p.as_array()
                    .ok_or_else(|| anyhow!("Invalid MultiPolygon: polygon must be an array"))
                    .and_then(|rings| parse_polygon_coords(rings)))
                .collect::<Result<Vec<_>>>()?;
            Ok(MultiPolygon(polygons))
        }
        other => bail!("Unsupported geometry type: {other:?}"),
    }
}

/// Parse polygon coordinates `[exterior, hole, hole, ...]`.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array()
            .ok_or_else(|| anyhow!("Invalid Polygon: ring must be an array"))
            .and_then(|r| parse_ring_coords(r))
    });

    let exterior = rings.next()
        .unwrap_or_else(|| Ok(LineString(vec![])))?;
    let interiors = rings.collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring from GeoJSON coordinates `[[lng, lat], ...]`, closing it if needed.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len() + 1);

    for coord_pair in coords {
        let pair = coord_pair.as_array()
            .filter(|a| a.len() >= 2)
            .ok_or_else(|| anyhow!("Invalid coordinate: expected [lng, lat]"))?;
        let x = pair[0].as_f64()
            .ok_or_else(|| anyhow!("Invalid coordinate: longitude must be a number"))?;
        let y = pair[1].as_f64()
            .ok_or_else(|| anyhow!("Invalid coordinate: latitude must be a number"))?;
        if !x.is_finite() || !y.is_finite() {
            bail!("Invalid coordinate: [{x}, {y}] is not finite");
        }
        points.push(Coord { x, y });
    }

    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }

    Ok(LineString(points))
}

/// Write features as a GeoJSON FeatureCollection.
pub fn write_features<'a>(features: impl IntoIterator<Item = (Option<&'a str>, &'a MultiPolygon<f64>)>) -> Result<Vec<u8>> {
    let features: Vec<Value> = features.into_iter().enumerate().map(|(idx, (label, mp))| {
        let polygons: Vec<Value> = mp.0.iter().map(|polygon| {
            let rings: Vec<Vec<[f64; 2]>> = std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
                .collect();
            json!(rings)
        }).collect();

        json!({
            "type": "Feature",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": polygons,
            },
            "properties": {
                "index": idx,
                "name": label,
            }
        })
    }).collect();

    let feature_collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });

    serde_json::to_vec(&feature_collection).context("Failed to serialize GeoJSON to bytes")
}
