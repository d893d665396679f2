//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented storage contracts.
//! - Keep SQLite query details out of service orchestration.
//!
//! # Invariants
//! - Every contract has an in-memory backend and an SQLite backend with the
//!   same observable semantics.
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyCompleted`)
//!   in addition to DB transport errors.

pub mod kv_repo;
pub mod ledger_repo;
