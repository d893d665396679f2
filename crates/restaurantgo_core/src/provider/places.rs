//! Places lookup capability.
//!
//! # Responsibility
//! - Define the nearby-search contract used by `NearbyService`.
//! - Ship the providers the core can run without network access.

use crate::geo::distance::distance_km;
use crate::model::geo::GeoCoordinate;
use crate::model::place::PlaceRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default nearby search radius in meters.
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No API credentials/endpoint were configured.
    NotConfigured,
    InvalidRequest(String),
    Failed(String),
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "places lookup failed: provider not configured"),
            Self::InvalidRequest(message) => write!(f, "places lookup failed: {message}"),
            Self::Failed(message) => write!(f, "places lookup failed: {message}"),
        }
    }
}

impl Error for LookupError {}

pub trait PlacesProvider {
    fn search_nearby(
        &self,
        center: &GeoCoordinate,
        radius_m: u32,
    ) -> Result<Vec<PlaceRecord>, LookupError>;
}

/// Placeholder for the remote places API until credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredPlacesProvider;

impl PlacesProvider for UnconfiguredPlacesProvider {
    fn search_nearby(
        &self,
        _center: &GeoCoordinate,
        _radius_m: u32,
    ) -> Result<Vec<PlaceRecord>, LookupError> {
        Err(LookupError::NotConfigured)
    }
}

/// Serves a fixed catalogue, filtered to the requested radius.
#[derive(Debug, Clone, Default)]
pub struct StaticPlacesProvider {
    places: Vec<PlaceRecord>,
}

impl StaticPlacesProvider {
    pub fn new(places: Vec<PlaceRecord>) -> Self {
        Self { places }
    }
}

impl PlacesProvider for StaticPlacesProvider {
    fn search_nearby(
        &self,
        center: &GeoCoordinate,
        radius_m: u32,
    ) -> Result<Vec<PlaceRecord>, LookupError> {
        center
            .validate()
            .map_err(|err| LookupError::InvalidRequest(err.to_string()))?;
        let radius_km = f64::from(radius_m) / 1000.0;

        Ok(self
            .places
            .iter()
            .filter(|place| {
                distance_km(center, &place.location).is_ok_and(|distance| distance <= radius_km)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{LookupError, PlacesProvider, StaticPlacesProvider, UnconfiguredPlacesProvider};
    use crate::model::geo::GeoCoordinate;
    use crate::model::place::PlaceRecord;

    #[test]
    fn unconfigured_provider_always_fails() {
        let result = UnconfiguredPlacesProvider.search_nearby(&GeoCoordinate::new(41.0, 29.0), 2000);
        assert_eq!(result.unwrap_err(), LookupError::NotConfigured);
    }

    #[test]
    fn static_provider_filters_by_radius() {
        let provider = StaticPlacesProvider::new(vec![
            PlaceRecord::new("near", "Near", "", GeoCoordinate::new(41.0010, 29.0)),
            PlaceRecord::new("far", "Far", "", GeoCoordinate::new(41.1, 29.0)),
        ]);
        let found = provider
            .search_nearby(&GeoCoordinate::new(41.0, 29.0), 1000)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "near");
    }

    #[test]
    fn static_provider_rejects_invalid_center() {
        let provider = StaticPlacesProvider::default();
        assert!(matches!(
            provider.search_nearby(&GeoCoordinate::new(91.0, 0.0), 1000),
            Err(LookupError::InvalidRequest(_))
        ));
    }
}
