//! Geolocation capability consumed by the core.
//!
//! # Responsibility
//! - Define the provider contract for one-shot and watched positions.
//! - Provide `PushLocationProvider`, fed by the host platform (the Flutter
//!   side forwards device fixes into core).
//!
//! # Invariants
//! - Watch callbacks only ever receive validated coordinates; invalid fixes
//!   are routed to the error callback.
//! - A stopped watch handle never receives further callbacks.
//! - Callbacks run without the provider lock held, so they may call back
//!   into the provider (e.g. a one-shot watch stopping itself).

use crate::model::geo::GeoCoordinate;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

pub type LocationCallback = Box<dyn FnMut(GeoCoordinate) + Send>;
pub type LocationErrorCallback = Box<dyn FnMut(LocationError) + Send>;

/// Handle identifying one active location watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatchHandle(Uuid);

impl WatchHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for WatchHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for WatchHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reasons a device position could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    PermissionDenied,
    Unavailable(String),
    TimedOut(Duration),
}

impl Display for LocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "location unavailable: permission denied"),
            Self::Unavailable(reason) => write!(f, "location unavailable: {reason}"),
            Self::TimedOut(timeout) => write!(
                f,
                "location unavailable: no fix within {} ms",
                timeout.as_millis()
            ),
        }
    }
}

impl Error for LocationError {}

/// Geolocation capability.
pub trait LocationProvider {
    /// Returns the current device position.
    fn current_location(&self) -> Result<GeoCoordinate, LocationError>;

    /// Registers callbacks for position changes.
    fn watch_location(
        &self,
        on_change: LocationCallback,
        on_error: LocationErrorCallback,
    ) -> Result<WatchHandle, LocationError>;

    /// Stops a watch; unknown handles are ignored.
    fn stop_watching(&self, handle: WatchHandle);
}

struct Watcher {
    on_change: LocationCallback,
    on_error: LocationErrorCallback,
}

type SharedWatcher = Arc<Mutex<Watcher>>;

#[derive(Default)]
struct PushState {
    permission_granted: bool,
    last_fix: Option<GeoCoordinate>,
    watchers: BTreeMap<WatchHandle, SharedWatcher>,
}

/// Location provider whose fixes are pushed in by the host platform.
pub struct PushLocationProvider {
    state: Mutex<PushState>,
}

impl PushLocationProvider {
    /// Creates a provider with permission granted and no fix yet.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PushState {
                permission_granted: true,
                ..PushState::default()
            }),
        }
    }

    /// Records the platform permission decision.
    pub fn set_permission(&self, granted: bool) {
        self.lock().permission_granted = granted;
    }

    /// Delivers one fix from the platform to the provider and its watchers.
    pub fn push_fix(&self, coordinate: GeoCoordinate) {
        match coordinate.validate() {
            Ok(()) => {
                let watchers = {
                    let mut state = self.lock();
                    state.last_fix = Some(coordinate);
                    state.watchers.len()
                };
                debug!("event=location_fix module=location status=ok watchers={watchers}");
                self.dispatch(|watcher| (watcher.on_change)(coordinate));
            }
            Err(err) => {
                warn!("event=location_fix module=location status=rejected error={err}");
                let error = LocationError::Unavailable(err.to_string());
                self.dispatch(|watcher| (watcher.on_error)(error.clone()));
            }
        }
    }

    /// Delivers a platform failure to all watchers.
    pub fn push_error(&self, error: LocationError) {
        self.dispatch(|watcher| (watcher.on_error)(error.clone()));
    }

    pub fn active_watch_count(&self) -> usize {
        self.lock().watchers.len()
    }

    /// Calls `deliver` on a snapshot of the registered watchers.
    ///
    /// Each handle is re-checked right before its callback, so a watch stopped
    /// by an earlier callback in the same round is skipped.
    fn dispatch(&self, mut deliver: impl FnMut(&mut Watcher)) {
        let targets: Vec<(WatchHandle, SharedWatcher)> = self
            .lock()
            .watchers
            .iter()
            .map(|(handle, watcher)| (*handle, Arc::clone(watcher)))
            .collect();

        for (handle, watcher) in targets {
            let still_active = self.lock().watchers.contains_key(&handle);
            if !still_active {
                continue;
            }
            let mut watcher = watcher
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            deliver(&mut *watcher);
        }
    }

    fn lock(&self) -> MutexGuard<'_, PushState> {
        // Recover from poisoning; every write to the state is a single step.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for PushLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for PushLocationProvider {
    fn current_location(&self) -> Result<GeoCoordinate, LocationError> {
        let state = self.lock();
        if !state.permission_granted {
            return Err(LocationError::PermissionDenied);
        }
        state
            .last_fix
            .ok_or_else(|| LocationError::Unavailable("no fix received yet".to_string()))
    }

    fn watch_location(
        &self,
        on_change: LocationCallback,
        on_error: LocationErrorCallback,
    ) -> Result<WatchHandle, LocationError> {
        let mut state = self.lock();
        if !state.permission_granted {
            return Err(LocationError::PermissionDenied);
        }
        let handle = WatchHandle::new();
        state.watchers.insert(
            handle,
            Arc::new(Mutex::new(Watcher {
                on_change,
                on_error,
            })),
        );
        Ok(handle)
    }

    fn stop_watching(&self, handle: WatchHandle) {
        self.lock().watchers.remove(&handle);
    }
}
