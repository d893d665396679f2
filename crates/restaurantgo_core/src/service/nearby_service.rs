//! Nearby restaurant lookup with offline fallback.
//!
//! # Responsibility
//! - Query the places provider around a center point.
//! - Fall back to the bundled catalogue on lookup failure or when no usable
//!   place is returned.
//! - Refetch only when the user has moved past the refresh threshold.
//!
//! # Invariants
//! - Results are sorted by distance from the center, nearest first.
//! - Places with invalid coordinates are dropped, never returned.

use crate::config::CoreConfig;
use crate::fixtures::demo_restaurants;
use crate::geo::distance::distance_km;
use crate::geo::refresh::RefreshTracker;
use crate::model::geo::{GeoCoordinate, GeoError};
use crate::model::place::PlaceRecord;
use crate::provider::places::{LookupError, PlacesProvider};
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearbySource {
    Provider,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyPlace {
    pub place: PlaceRecord,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyResult {
    pub center: GeoCoordinate,
    pub places: Vec<NearbyPlace>,
    pub source: NearbySource,
}

pub struct NearbyService<P: PlacesProvider> {
    provider: P,
    fallback: Vec<PlaceRecord>,
    radius_m: u32,
    places_enabled: bool,
    tracker: RefreshTracker,
}

impl<P: PlacesProvider> NearbyService<P> {
    /// Creates a service with the bundled restaurant catalogue as fallback.
    pub fn new(provider: P, config: &CoreConfig) -> Self {
        Self {
            provider,
            fallback: demo_restaurants(),
            radius_m: config.search_radius_m,
            places_enabled: config.places_enabled,
            tracker: RefreshTracker::new(config.refresh_threshold_km),
        }
    }

    pub fn with_fallback(mut self, fallback: Vec<PlaceRecord>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Location of the last fetch, if any.
    pub fn last_center(&self) -> Option<GeoCoordinate> {
        self.tracker.anchor()
    }

    /// Fetches places around `center` unconditionally.
    ///
    /// # Errors
    /// - `GeoError::InvalidCoordinate` for an invalid center. Lookup failures
    ///   are not errors; they produce the fallback list.
    pub fn fetch(&mut self, center: &GeoCoordinate) -> Result<NearbyResult, GeoError> {
        center.validate()?;
        self.tracker.reset_anchor(*center);

        let (places, source) = match self.lookup(center) {
            Ok(places) => {
                let ranked = rank_by_distance(center, places);
                if ranked.is_empty() {
                    info!("event=nearby_fetch module=nearby status=fallback reason=empty");
                    (self.ranked_fallback(center), NearbySource::Fallback)
                } else {
                    (ranked, NearbySource::Provider)
                }
            }
            Err(err) => {
                warn!("event=nearby_fetch module=nearby status=fallback error={err}");
                (self.ranked_fallback(center), NearbySource::Fallback)
            }
        };

        debug!(
            "event=nearby_fetch module=nearby status=ok count={}",
            places.len()
        );
        Ok(NearbyResult {
            center: *center,
            places,
            source,
        })
    }

    /// Handles a location update, refetching only past the threshold.
    ///
    /// Returns `None` when the user has not moved far enough.
    pub fn on_location_update(
        &mut self,
        location: &GeoCoordinate,
    ) -> Result<Option<NearbyResult>, GeoError> {
        let decision = self.tracker.observe(location)?;
        if !decision.should_refresh {
            return Ok(None);
        }
        self.fetch(location).map(Some)
    }

    fn ranked_fallback(&self, center: &GeoCoordinate) -> Vec<NearbyPlace> {
        rank_by_distance(center, self.fallback.clone())
    }

    fn lookup(&self, center: &GeoCoordinate) -> Result<Vec<PlaceRecord>, LookupError> {
        if !self.places_enabled {
            return Err(LookupError::NotConfigured);
        }
        self.provider.search_nearby(center, self.radius_m)
    }
}

fn rank_by_distance(center: &GeoCoordinate, places: Vec<PlaceRecord>) -> Vec<NearbyPlace> {
    let mut ranked: Vec<NearbyPlace> = places
        .into_iter()
        .filter_map(|place| match distance_km(center, &place.location) {
            Ok(distance_km) => Some(NearbyPlace { place, distance_km }),
            Err(err) => {
                warn!("event=nearby_rank module=nearby status=skipped error={err}");
                None
            }
        })
        .collect();
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}
