//! Shared utilities for Roster Sync backend.
//!
//! This crate contains cross-cutting helpers used by all other crates:
//! - Value parsing (dates, numbers, emails, phone numbers)
//! - Pagination parameters for list endpoints

pub mod pagination;
pub mod parsing;
