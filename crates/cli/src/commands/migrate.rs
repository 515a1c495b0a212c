//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! leaddesk migrate
//! ```
//!
//! Migrations live in `crates/admin/migrations/` and are embedded at build
//! time.

use super::CliError;

/// Run the admin database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
