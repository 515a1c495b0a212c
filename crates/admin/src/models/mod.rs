//! Domain models for admin.
//!
//! These are validated domain objects; row types used for database mapping
//! live next to their queries in [`crate::db`].

pub mod admin_user;
pub mod agent;
pub mod lead;
pub mod session;

pub use admin_user::AdminUser;
pub use agent::{Agent, AgentSummary, AgentValidationError, NewAgent, Recipient};
pub use lead::{AgentAssignmentCount, Assignment, AssignmentDetail, AssignmentStats, Lead};
pub use session::{CurrentAdmin, keys as session_keys};
