use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::super::value_objects::geo_point::{deserialize_opt_geo, GeoPoint};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::Validator;

/// One record from an import batch. Lives only for the duration of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomingRecord {
    #[serde(default)]
    pub name: String,

    #[serde(
        default,
        alias = "formationDate",
        deserialize_with = "deserialize_opt_date"
    )]
    pub formation_date: Option<NaiveDate>,

    #[serde(default, alias = "formationSite")]
    pub formation_site: Option<String>,

    #[serde(default, deserialize_with = "deserialize_opt_geo")]
    pub formation_geo: Option<GeoPoint>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, alias = "wikipediaUrl")]
    pub wikipedia_url: Option<String>,
}

impl IncomingRecord {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Records without a usable name cannot be matched and are rejected.
    pub fn validate(&self) -> AppResult<()> {
        Validator::validate_unit_name(&self.name)
    }
}

/// The stored counterpart: same fields plus the store-assigned id, with the
/// geometry column read back as a coordinate pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: i32,
    pub name: String,
    pub formation_date: Option<NaiveDate>,
    pub formation_site: Option<String>,
    pub location: Option<GeoPoint>,
    pub description: Option<String>,
    pub wikipedia_url: Option<String>,
}

/// Treat empty strings like NULL: the legacy data carries both
/// interchangeably and a backfill must be allowed to replace either.
pub fn is_empty_field(value: &Option<String>) -> bool {
    match value {
        None => true,
        Some(s) => s.trim().is_empty(),
    }
}

/// Dates arrive in whatever shape the source JSON happened to use: ISO dates,
/// full timestamps, or the `dd.mm.yyyy` convention of the scanned archives.
pub fn parse_date_lenient(raw: &str) -> AppResult<NaiveDate> {
    let raw = raw.trim().trim_end_matches('.');
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d.%m.%Y") {
        return Ok(date);
    }
    Err(AppError::ValidationError(format!(
        "Unrecognized date format: '{}'",
        raw
    )))
}

fn deserialize_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date_lenient(&s).map(Some).map_err(D::Error::custom),
    }
}
