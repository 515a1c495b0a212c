//! CLI command implementations.
//!
//! Every command loads `.env` first and connects with
//! `LEADDESK_DATABASE_URL` (or `DATABASE_URL`).

pub mod admin;
pub mod agent;
pub mod leads;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use leaddesk_admin::db::{RepositoryError, create_pool};
use leaddesk_admin::models::AgentValidationError;
use leaddesk_admin::services::{AuthError, DistributionError};
use leaddesk_core::EmailError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Admin could not be created.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Invalid email argument.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Agent input failed validation.
    #[error("Invalid agent: {0}")]
    InvalidAgent(#[from] AgentValidationError),

    /// No agent has the given email.
    #[error("No agent with email {0}")]
    AgentNotFound(String),

    /// The lead file was not distributed.
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    /// Local file operation failed.
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connect to the LeadDesk database.
async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("LEADDESK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CliError::MissingEnvVar("LEADDESK_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(create_pool(&SecretString::from(database_url)).await?)
}
