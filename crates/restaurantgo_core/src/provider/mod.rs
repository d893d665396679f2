//! External capabilities consumed by the core.
//!
//! # Responsibility
//! - Define provider traits for geolocation and places lookup.
//! - Keep platform and network specifics behind those traits.
//!
//! # Invariants
//! - Provider failures are typed (`LocationError`, `LookupError`); fallback
//!   policy lives in the services, never in providers.

pub mod location;
pub mod places;
