//! Geographic points and travelers

use serde::{Deserialize, Serialize};

use crate::{MeetPointError, Result};

/// A point on the globe in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees, -90 to 90
    pub latitude: f64,
    /// Longitude in decimal degrees, -180 to 180
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point, rejecting coordinates outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(MeetPointError::validation(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(MeetPointError::validation(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Shift the point by a number of degrees.
    ///
    /// Latitude saturates at the poles and longitude wraps across the
    /// antimeridian, so the result is always a valid point.
    #[must_use]
    pub fn offset(&self, delta_latitude: f64, delta_longitude: f64) -> Self {
        let latitude = (self.latitude + delta_latitude).clamp(-90.0, 90.0);
        let mut longitude = (self.longitude + delta_longitude + 180.0).rem_euclid(360.0) - 180.0;
        if longitude == -180.0 && self.longitude + delta_longitude > 0.0 {
            longitude = 180.0;
        }
        Self {
            latitude,
            longitude,
        }
    }

    /// Format point as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Raw traveler details as entered by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelerInput {
    pub name: String,
    pub origin_airport: String,
}

impl TravelerInput {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, origin_airport: C) -> Self {
        Self {
            name: name.into(),
            origin_airport: origin_airport.into(),
        }
    }

    /// Parse `NAME=CODE` as accepted on the command line
    pub fn parse(input: &str) -> Result<Self> {
        let (name, code) = input.split_once('=').ok_or_else(|| {
            MeetPointError::validation(format!("Traveler must be in format 'NAME=CODE', got: {input}"))
        })?;
        Ok(Self::new(name.trim(), code.trim()))
    }

    /// Validate the name and normalize the airport code
    pub fn normalized(&self) -> Result<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(MeetPointError::validation("Traveler name cannot be empty"));
        }
        Ok(Self {
            name: name.to_string(),
            origin_airport: normalize_airport_code(&self.origin_airport)?,
        })
    }
}

/// A traveler whose home airport has been located
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traveler {
    pub name: String,
    pub origin_airport: String,
    pub home: GeoPoint,
}

impl Traveler {
    #[must_use]
    pub fn new(input: TravelerInput, home: GeoPoint) -> Self {
        Self {
            name: input.name,
            origin_airport: input.origin_airport,
            home,
        }
    }
}

/// Trim and upper-case an IATA airport code, rejecting anything that is
/// not three ASCII letters.
pub fn normalize_airport_code(code: &str) -> Result<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(MeetPointError::validation(format!(
            "Airport code must be three letters, got: '{code}'"
        )));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(40.6413, -73.7781).is_ok());
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(90.1, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -180.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[rstest]
    #[case((10.0, 20.0), (5.0, 5.0), (15.0, 25.0))]
    #[case((88.0, 0.0), (5.0, 0.0), (90.0, 0.0))]
    #[case((-88.0, 0.0), (-5.0, 0.0), (-90.0, 0.0))]
    #[case((0.0, 178.0), (0.0, 5.0), (0.0, -177.0))]
    #[case((0.0, -178.0), (0.0, -5.0), (0.0, 177.0))]
    #[case((0.0, 175.0), (0.0, 5.0), (0.0, 180.0))]
    fn test_offset_stays_in_range(
        #[case] start: (f64, f64),
        #[case] delta: (f64, f64),
        #[case] expected: (f64, f64),
    ) {
        let point = GeoPoint::new(start.0, start.1).unwrap().offset(delta.0, delta.1);
        assert!((point.latitude - expected.0).abs() < 1e-9);
        assert!((point.longitude - expected.1).abs() < 1e-9);
    }

    #[rstest]
    #[case("jfk", "JFK")]
    #[case(" lax ", "LAX")]
    #[case("Ord", "ORD")]
    fn test_normalize_airport_code(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_airport_code(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("JF")]
    #[case("JFKX")]
    #[case("J1K")]
    fn test_invalid_airport_code(#[case] input: &str) {
        assert!(matches!(
            normalize_airport_code(input),
            Err(MeetPointError::Validation { .. })
        ));
    }

    #[test]
    fn test_traveler_input_parse() {
        let input = TravelerInput::parse("Ada = jfk").unwrap();
        assert_eq!(input.name, "Ada");
        assert_eq!(input.normalized().unwrap().origin_airport, "JFK");

        assert!(TravelerInput::parse("Ada JFK").is_err());
        assert!(TravelerInput::new("  ", "JFK").normalized().is_err());
    }
}
