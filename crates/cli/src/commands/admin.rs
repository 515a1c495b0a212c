//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! leaddesk admin create -e admin@example.com -n "Admin Name" -p 'long password'
//! ```

use leaddesk_admin::services::AuthService;
use leaddesk_core::AdminUserId;

use super::CliError;

/// Create an admin who can log in to the API.
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns an error for an invalid email, a short password, a duplicate
/// email or a database failure.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<AdminUserId, CliError> {
    let pool = super::connect().await?;

    tracing::info!("Creating admin user: {}", email);
    let user = AuthService::new(&pool).register(email, name, password).await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}
