//! Location acquisition with timeout and fallback.
//!
//! # Responsibility
//! - Bound how long a caller waits for a device fix.
//! - Turn every acquisition failure into the configured default location.
//!
//! # Invariants
//! - `current_location` never fails; it reports where the value came from.
//! - A provider that hangs or panics cannot block the caller past the
//!   configured timeout.
//! - At most one acquisition worker exists at a time; while a timed-out
//!   worker is still blocked in the provider, new requests fall back at once.

use crate::config::CoreConfig;
use crate::model::geo::GeoCoordinate;
use crate::provider::location::{
    LocationCallback, LocationError, LocationErrorCallback, LocationProvider, WatchHandle,
};
use log::{info, warn};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Device,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLocation {
    pub coordinate: GeoCoordinate,
    pub source: LocationSource,
}

pub struct LocationService<P> {
    provider: Arc<P>,
    timeout: Duration,
    fallback: GeoCoordinate,
    worker_busy: Arc<AtomicBool>,
}

/// Clears the busy flag when the worker finishes or unwinds.
struct WorkerSlot(Arc<AtomicBool>);

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<P> LocationService<P>
where
    P: LocationProvider + Send + Sync + 'static,
{
    pub fn new(provider: Arc<P>, config: &CoreConfig) -> Self {
        Self {
            provider,
            timeout: config.location_timeout(),
            fallback: config.default_location,
            worker_busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Asks the provider for a fix, waiting at most the configured timeout.
    ///
    /// # Errors
    /// - `LocationError::TimedOut` when no answer arrives in time.
    /// - `LocationError::Unavailable` when the provider returns an invalid
    ///   coordinate, its worker dies, or an earlier worker is still blocked.
    /// - Any error the provider itself reports.
    pub fn try_current_location(&self) -> Result<GeoCoordinate, LocationError> {
        if self.worker_busy.swap(true, Ordering::AcqRel) {
            return Err(LocationError::Unavailable(
                "previous location request still pending".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel();
        let provider = Arc::clone(&self.provider);
        let slot = WorkerSlot(Arc::clone(&self.worker_busy));
        thread::Builder::new()
            .name("location-acquire".to_string())
            .spawn(move || {
                let result = provider.current_location();
                // Free the slot before answering so the caller can retry at once.
                drop(slot);
                // The receiver may be gone after a timeout.
                let _ = tx.send(result);
            })
            .map_err(|err| {
                LocationError::Unavailable(format!("failed to start location worker: {err}"))
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(coordinate)) => {
                coordinate
                    .validate()
                    .map_err(|err| LocationError::Unavailable(err.to_string()))?;
                Ok(coordinate)
            }
            Ok(Err(err)) => Err(err),
            Err(RecvTimeoutError::Timeout) => Err(LocationError::TimedOut(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(LocationError::Unavailable(
                "location worker exited without a result".to_string(),
            )),
        }
    }

    /// Returns a device fix, or the default location on any failure.
    pub fn current_location(&self) -> ResolvedLocation {
        let started_at = Instant::now();
        match self.try_current_location() {
            Ok(coordinate) => {
                info!(
                    "event=location_acquire module=location status=ok source=device duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                ResolvedLocation {
                    coordinate,
                    source: LocationSource::Device,
                }
            }
            Err(err) => {
                warn!(
                    "event=location_acquire module=location status=fallback duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                ResolvedLocation {
                    coordinate: self.fallback,
                    source: LocationSource::Fallback,
                }
            }
        }
    }

    pub fn watch(
        &self,
        on_change: LocationCallback,
        on_error: LocationErrorCallback,
    ) -> Result<WatchHandle, LocationError> {
        let handle = self.provider.watch_location(on_change, on_error)?;
        info!("event=location_watch module=location status=started handle={handle}");
        Ok(handle)
    }

    pub fn stop_watching(&self, handle: WatchHandle) {
        self.provider.stop_watching(handle);
        info!("event=location_watch module=location status=stopped handle={handle}");
    }
}
