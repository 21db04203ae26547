//! Roster domain model.
//!
//! # Responsibility
//! - Define the canonical identity type shared by teachers and students.
//! - Define read models returned by the relationship store.
//!
//! # Invariants
//! - Every teacher and student is identified by a `MailId`.
//! - Registrations are edges, not owned collections on either side.

pub mod identity;
pub mod roster;
