//! Domain layer for Roster Sync.
//!
//! This crate contains:
//! - Domain models (entity types, import jobs, vendor files, change proposals)
//! - Pure import-pipeline services (header normalization, column mapping,
//!   row validation, vendor change detection)
//!
//! Nothing in this crate touches storage; the persistence and api crates
//! compose these pieces around the database.

pub mod models;
pub mod services;
