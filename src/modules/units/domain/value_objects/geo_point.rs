use serde::{Deserialize, Deserializer, Serialize};

use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::Validator;

/// A WGS84 coordinate pair. Both components are required; a record carrying
/// only one of them is malformed input, not a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        Validator::validate_latitude(latitude)?;
        Validator::validate_longitude(longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// WKT representation for `ST_GeomFromText`. MySQL points are X=lon Y=lat.
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }
}

/// Raw shape as it appears in import JSON, where either side may be absent.
#[derive(Debug, Deserialize)]
struct RawGeo {
    latitude: Option<f64>,
    #[serde(alias = "lng", alias = "lon")]
    longitude: Option<f64>,
}

/// Deserializer for optional geo fields that distinguishes "absent" from
/// "half a coordinate pair": the latter is a validation error so data-entry
/// mistakes surface instead of silently losing the location.
pub fn deserialize_opt_geo<'de, D>(deserializer: D) -> Result<Option<GeoPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw: Option<RawGeo> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawGeo {
            latitude: Some(lat),
            longitude: Some(lon),
        }) => GeoPoint::new(lat, lon).map(Some).map_err(D::Error::custom),
        Some(RawGeo {
            latitude: None,
            longitude: None,
        }) => Ok(None),
        Some(_) => Err(D::Error::custom(AppError::ValidationError(
            "Coordinate pair must carry both latitude and longitude".to_string(),
        ))),
    }
}
