//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold tunables for location, refresh and places lookup.
//! - Load overrides from the JSON document the host app passes in.
//!
//! # Invariants
//! - Missing JSON fields fall back to `CoreConfig::default()`.
//! - A config returned by `from_json_str` has passed `validate()`.

use crate::geo::refresh::DEFAULT_REFRESH_THRESHOLD_KM;
use crate::model::geo::{GeoCoordinate, GeoError, DEFAULT_LOCATION};
use crate::provider::places::DEFAULT_SEARCH_RADIUS_M;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Movement in km that triggers a nearby-places refetch.
    pub refresh_threshold_km: f64,
    pub search_radius_m: u32,
    pub location_timeout_ms: u64,
    pub default_location: GeoCoordinate,
    /// When `false`, nearby lookups go straight to the bundled fixtures.
    pub places_enabled: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            refresh_threshold_km: DEFAULT_REFRESH_THRESHOLD_KM,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            location_timeout_ms: DEFAULT_LOCATION_TIMEOUT_MS,
            default_location: DEFAULT_LOCATION,
            places_enabled: false,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_millis(self.location_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.refresh_threshold_km.is_finite() || self.refresh_threshold_km < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "refresh_threshold_km must be a non-negative number, got {}",
                self.refresh_threshold_km
            )));
        }
        if self.search_radius_m == 0 {
            return Err(ConfigError::Invalid(
                "search_radius_m must be greater than zero".to_string(),
            ));
        }
        if self.location_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "location_timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.default_location
            .validate()
            .map_err(ConfigError::DefaultLocation)?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(String),
    DefaultLocation(GeoError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "failed to parse core config: {err}"),
            Self::Invalid(message) => write!(f, "invalid core config: {message}"),
            Self::DefaultLocation(err) => write!(f, "invalid core config default_location: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::DefaultLocation(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use std::time::Duration;

    #[test]
    fn defaults_match_app_behavior() {
        let config = CoreConfig::default();
        assert_eq!(config.refresh_threshold_km, 0.5);
        assert_eq!(config.search_radius_m, 2000);
        assert_eq!(config.location_timeout(), Duration::from_secs(15));
        assert!(!config.places_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config = CoreConfig::from_json_str(r#"{"places_enabled": true}"#).unwrap();
        assert!(config.places_enabled);
        assert_eq!(config.search_radius_m, 2000);
    }

    #[test]
    fn invalid_default_location_is_rejected() {
        let err = CoreConfig::from_json_str(
            r#"{"default_location": {"latitude": 100.0, "longitude": 0.0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DefaultLocation(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            CoreConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
