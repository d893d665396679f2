//! Core domain logic for RestaurantGO.
//! This crate is the single source of truth for progression, ledger and
//! location invariants; the mobile UI only renders what it returns.

pub mod config;
pub mod db;
pub mod fixtures;
pub mod geo;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod progression;
pub mod provider;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use geo::distance::{distance_km, EARTH_RADIUS_KM};
pub use geo::refresh::{RefreshDecision, RefreshTracker};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::geo::{GeoCoordinate, GeoError, DEFAULT_LOCATION};
pub use model::ledger_item::{Achievement, LedgerItem, LedgerItemKind, Task};
pub use model::place::PlaceRecord;
pub use model::profile::UserProfile;
pub use navigation::{Destination, NavEvent, NavigationError, Navigator, Screen};
pub use progression::{
    level_for_xp, progression, progression_for_xp, Progression, ProgressionError, XP_PER_LEVEL,
};
pub use provider::location::{LocationError, LocationProvider, PushLocationProvider, WatchHandle};
pub use provider::places::{
    LookupError, PlacesProvider, StaticPlacesProvider, UnconfiguredPlacesProvider,
};
pub use repo::kv_repo::{KeyValueStore, KvError, KvResult, MemoryKvStore, SqliteKvStore};
pub use repo::ledger_repo::{
    Completion, InMemoryLedgerRepository, LedgerRepository, LedgerSeed, RepoError, RepoResult,
    SqliteLedgerRepository,
};
pub use service::ledger_service::{DailyBonus, LedgerError, LedgerService};
pub use service::location_service::{LocationService, LocationSource, ResolvedLocation};
pub use service::nearby_service::{NearbyPlace, NearbyResult, NearbyService, NearbySource};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
