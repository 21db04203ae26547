//! Repository layer over the roster store.
//!
//! # Responsibility
//! - Define the data access contract used by roster services.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Writes report semantic `*NotFound` errors separately from DB failures.

pub mod roster_repo;
