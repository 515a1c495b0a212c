//! LeadDesk Core - Shared domain types.
//!
//! This crate provides the types used across all LeadDesk components:
//! - `admin` - Admin API server (agents, lead uploads, assignments)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, validated emails, and normalized lead records
//! - [`distribute`] - Round-robin partitioning of records across recipients

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod distribute;
pub mod types;

pub use distribute::distribute;
pub use types::*;
