//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into roster use-cases.
//! - Keep calling layers decoupled from storage details.

pub mod mention;
pub mod roster_service;
