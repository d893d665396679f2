//! Geometry helpers over `GeoCoordinate`.
//!
//! # Responsibility
//! - Compute great-circle distances.
//! - Decide when a location update warrants refetching nearby places.

pub mod distance;
pub mod refresh;
