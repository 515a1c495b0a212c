//! LeadDesk admin library.
//!
//! Lead ingestion and round-robin distribution to sales agents, exposed
//! as a JSON API. The binary in `main.rs` and the `leaddesk` CLI both
//! build on this crate.
//!
//! # Modules
//!
//! - [`ingest`] - CSV and Excel parsing into lead records
//! - [`services`] - Distribution pipeline, assignment views, admin login
//! - [`db`] - `PostgreSQL` repositories and the transactional store
//! - [`routes`] - HTTP handlers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;
