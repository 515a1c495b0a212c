//! Admin user domain types.

use chrono::{DateTime, Utc};

use leaddesk_core::{AdminUserId, Email};

/// An administrator allowed to manage agents and upload leads.
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub name: String,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
    /// When the admin was last updated.
    pub updated_at: DateTime<Utc>,
}
