//! Domain model for the RestaurantGO core.
//!
//! # Responsibility
//! - Define canonical data structures used by ledger, location and places
//!   logic.
//! - Keep validation next to the data it guards.
//!
//! # Invariants
//! - Ledger items never transition from completed back to open.
//! - Profile level is always derived from XP.

pub mod geo;
pub mod ledger_item;
pub mod place;
pub mod profile;
