//! Business logic services for admin.
//!
//! # Services
//!
//! - `assignments` - Read-side views over who holds which lead
//! - `auth` - Argon2id password login for admins
//! - `distribution` - Upload parse, round-robin split and atomic persist
//! - `uploads` - Staged upload files that clean up after themselves

pub mod assignments;
pub mod auth;
pub mod distribution;
pub mod uploads;

pub use assignments::{AssignmentQueryService, AssignmentReader, GroupedLead, RecipientGroup};
pub use auth::{AuthError, AuthService};
pub use distribution::{
    DistributionCoordinator, DistributionError, DistributionSummary, ErrorKind, LeadStore,
    LeadTransaction, RecipientDirectory, RecipientShare,
};
pub use uploads::UploadedFile;
