//! Geographic coordinate model.
//!
//! # Responsibility
//! - Define the latitude/longitude value shared by location, distance and
//!   places code.
//! - Reject non-finite or out-of-range input before it reaches arithmetic.
//!
//! # Invariants
//! - A validated coordinate has `latitude` in `[-90, 90]` and `longitude` in
//!   `[-180, 180]`, both finite.
//! - `accuracy_m`, when present, is finite and non-negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Fallback position used whenever the device cannot provide one
/// (Istanbul city centre).
pub const DEFAULT_LOCATION: GeoCoordinate = GeoCoordinate {
    latitude: 41.0082,
    longitude: 28.9784,
    accuracy_m: None,
};

/// Latitude/longitude pair in IEEE-754 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported accuracy radius in meters, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
}

impl GeoCoordinate {
    /// Creates an unvalidated coordinate without accuracy metadata.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
        }
    }

    /// Creates a coordinate and validates it in one step.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let coordinate = Self::new(latitude, longitude);
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Attaches an accuracy radius in meters.
    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    /// Checks range and finiteness of every field.
    ///
    /// # Errors
    /// - Returns `GeoError::InvalidCoordinate` naming the first offending field.
    pub fn validate(&self) -> Result<(), GeoError> {
        if !self.latitude.is_finite() || !(MIN_LATITUDE..=MAX_LATITUDE).contains(&self.latitude) {
            return Err(GeoError::InvalidCoordinate {
                field: "latitude",
                value: self.latitude,
            });
        }
        if !self.longitude.is_finite()
            || !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude)
        {
            return Err(GeoError::InvalidCoordinate {
                field: "longitude",
                value: self.longitude,
            });
        }
        if let Some(accuracy) = self.accuracy_m {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(GeoError::InvalidCoordinate {
                    field: "accuracy_m",
                    value: accuracy,
                });
            }
        }
        Ok(())
    }
}

/// Coordinate validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoError {
    InvalidCoordinate { field: &'static str, value: f64 },
}

impl Display for GeoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCoordinate { field, value } => {
                write!(f, "invalid coordinate: {field} = {value}")
            }
        }
    }
}

impl Error for GeoError {}

#[cfg(test)]
mod tests {
    use super::{GeoCoordinate, GeoError, DEFAULT_LOCATION};

    #[test]
    fn default_location_is_valid() {
        assert!(DEFAULT_LOCATION.validate().is_ok());
    }

    #[test]
    fn boundary_values_are_accepted() {
        assert!(GeoCoordinate::try_new(90.0, 180.0).is_ok());
        assert!(GeoCoordinate::try_new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn out_of_range_latitude_is_rejected() {
        let err = GeoCoordinate::try_new(90.5, 0.0).unwrap_err();
        assert!(matches!(
            err,
            GeoError::InvalidCoordinate {
                field: "latitude",
                ..
            }
        ));
    }

    #[test]
    fn non_finite_longitude_is_rejected() {
        let err = GeoCoordinate::try_new(0.0, f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            GeoError::InvalidCoordinate {
                field: "longitude",
                ..
            }
        ));
    }

    #[test]
    fn negative_accuracy_is_rejected() {
        let coordinate = GeoCoordinate::new(41.0, 29.0).with_accuracy(-1.0);
        assert!(coordinate.validate().is_err());
    }
}
