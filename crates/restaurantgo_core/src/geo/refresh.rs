//! Movement-based refresh decision for nearby lookups.
//!
//! # Invariants
//! - The first observed location always triggers a refresh.
//! - A refresh is triggered only when movement strictly exceeds the threshold.
//! - The anchor moves only when a refresh is triggered, so slow drift still
//!   accumulates into a refresh eventually.

use crate::geo::distance::distance_km;
use crate::model::geo::{GeoCoordinate, GeoError};

pub const DEFAULT_REFRESH_THRESHOLD_KM: f64 = 0.5;

/// Outcome of observing one location update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshDecision {
    pub should_refresh: bool,
    /// Distance from the previous anchor; `None` when there was no anchor.
    pub moved_km: Option<f64>,
}

/// Tracks the location of the last fetch.
#[derive(Debug, Clone)]
pub struct RefreshTracker {
    threshold_km: f64,
    anchor: Option<GeoCoordinate>,
}

impl RefreshTracker {
    pub fn new(threshold_km: f64) -> Self {
        Self {
            threshold_km,
            anchor: None,
        }
    }

    pub fn threshold_km(&self) -> f64 {
        self.threshold_km
    }

    pub fn anchor(&self) -> Option<GeoCoordinate> {
        self.anchor
    }

    /// Records an explicit fetch at `location`.
    pub fn reset_anchor(&mut self, location: GeoCoordinate) {
        self.anchor = Some(location);
    }

    /// Decides whether `location` is far enough from the anchor to refetch.
    ///
    /// # Errors
    /// - Returns `GeoError::InvalidCoordinate` for invalid input; the anchor
    ///   is left unchanged.
    pub fn observe(&mut self, location: &GeoCoordinate) -> Result<RefreshDecision, GeoError> {
        location.validate()?;
        let Some(anchor) = self.anchor else {
            self.anchor = Some(*location);
            return Ok(RefreshDecision {
                should_refresh: true,
                moved_km: None,
            });
        };

        let moved = distance_km(&anchor, location)?;
        let should_refresh = moved > self.threshold_km;
        if should_refresh {
            self.anchor = Some(*location);
        }
        Ok(RefreshDecision {
            should_refresh,
            moved_km: Some(moved),
        })
    }
}

impl Default for RefreshTracker {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_THRESHOLD_KM)
    }
}
