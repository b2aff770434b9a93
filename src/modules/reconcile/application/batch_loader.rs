use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::log_debug;
use crate::modules::units::domain::entities::unit_record::parse_date_lenient;
use crate::modules::units::{EntityKind, GeoPoint, IncomingRecord};
use crate::shared::errors::{AppError, AppResult};

/// Materialize an import batch from a JSON file.
///
/// Three shapes are accepted, matching what the various data drops actually
/// look like:
/// - a plain array of records,
/// - an object wrapping the array under the kind's plural key
///   (`{"brigades": [...]}`),
/// - a GeoJSON FeatureCollection with Croatian property names
///   (`naziv`, `mesto_formiranja`, `datum_formiranja`, `opis`, `wikipedia`).
pub fn load_batch(kind: EntityKind, path: &Path) -> AppResult<Vec<IncomingRecord>> {
    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;

    let records: Vec<IncomingRecord> = if value.is_array() {
        serde_json::from_value(value)?
    } else if value.get("features").is_some() {
        parse_feature_collection(&value)?
    } else if let Some(inner) = value.get(kind.table_name()).filter(|v| v.is_array()) {
        serde_json::from_value(inner.clone())?
    } else {
        return Err(AppError::InvalidInput(format!(
            "Expected a record array, a \"{}\" wrapper, or a FeatureCollection in {}",
            kind.table_name(),
            path.display()
        )));
    };

    log_debug!(
        "Loaded {} {} record(s) from {}",
        records.len(),
        kind.label(),
        path.display()
    );
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: Option<FeatureGeometry>,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    #[serde(default)]
    naziv: Option<String>,
    #[serde(default)]
    mesto_formiranja: Option<String>,
    #[serde(default)]
    datum_formiranja: Option<String>,
    #[serde(default)]
    opis: Option<String>,
    #[serde(default)]
    wikipedia: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeatureGeometry {
    coordinates: [f64; 2],
}

fn parse_feature_collection(value: &Value) -> AppResult<Vec<IncomingRecord>> {
    let collection: FeatureCollection = serde_json::from_value(value.clone())?;

    collection
        .features
        .into_iter()
        .map(|feature| {
            // GeoJSON stores [longitude, latitude]
            let formation_geo = feature
                .geometry
                .map(|g| GeoPoint::new(g.coordinates[1], g.coordinates[0]))
                .transpose()?;
            let formation_date = feature
                .properties
                .datum_formiranja
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(parse_date_lenient)
                .transpose()?;

            Ok(IncomingRecord {
                name: feature.properties.naziv.unwrap_or_default(),
                formation_date,
                formation_site: feature.properties.mesto_formiranja,
                formation_geo,
                description: feature.properties.opis,
                wikipedia_url: feature.properties.wikipedia,
            })
        })
        .collect()
}
