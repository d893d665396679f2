//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repositories and providers into use-case level APIs.
//! - Apply fallback policy for recoverable failures (location, places).
//! - Keep UI/FFI layers decoupled from storage and platform details.

pub mod ledger_service;
pub mod location_service;
pub mod nearby_service;
