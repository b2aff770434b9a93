use crate::shared::errors::AppError;

pub struct Validator;

impl Validator {
    pub fn validate_unit_name(name: &str) -> Result<(), AppError> {
        if name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Unit name cannot be empty".to_string(),
            ));
        }
        if name.len() > 255 {
            return Err(AppError::ValidationError(
                "Unit name too long (max 255 characters)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_latitude(latitude: f64) -> Result<(), AppError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::ValidationError(format!(
                "Latitude {} out of range [-90, 90]",
                latitude
            )));
        }
        Ok(())
    }

    pub fn validate_longitude(longitude: f64) -> Result<(), AppError> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::ValidationError(format!(
                "Longitude {} out of range [-180, 180]",
                longitude
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        assert!(Validator::validate_unit_name("").is_err());
        assert!(Validator::validate_unit_name("   ").is_err());
    }

    #[test]
    fn ordinary_name_passes() {
        assert!(Validator::validate_unit_name("3rd Dalmatian Brigade").is_ok());
    }

    #[test]
    fn overlong_name_is_rejected() {
        let name = "a".repeat(256);
        assert!(Validator::validate_unit_name(&name).is_err());
    }

    #[test]
    fn coordinate_ranges_are_enforced() {
        assert!(Validator::validate_latitude(43.5).is_ok());
        assert!(Validator::validate_latitude(91.0).is_err());
        assert!(Validator::validate_longitude(16.4).is_ok());
        assert!(Validator::validate_longitude(-180.5).is_err());
    }
}
