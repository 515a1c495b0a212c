//! Core types for LeadDesk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod record;

pub use email::{Email, EmailError};
pub use id::*;
pub use record::LeadRecord;
