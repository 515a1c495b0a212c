//! Agent management commands.
//!
//! # Usage
//!
//! ```bash
//! leaddesk agent create -n "Sarah Lee" -e sarah@example.com -p "+1 201 555 0123"
//! leaddesk agent list
//! leaddesk agent delete -e sarah@example.com
//! ```

use leaddesk_admin::db::AgentRepository;
use leaddesk_admin::models::NewAgent;
use leaddesk_core::{AgentId, Email};

use super::CliError;

/// Create an agent that will receive leads.
///
/// # Errors
///
/// Returns an error if validation fails, the email is taken, or the
/// database is unreachable.
pub async fn create(name: &str, email: &str, phone: &str) -> Result<AgentId, CliError> {
    let agent = NewAgent::parse(name, email, phone)?;
    let pool = super::connect().await?;

    let agent = AgentRepository::new(&pool).create(&agent).await?;
    tracing::info!(
        "Agent created! ID: {}, Name: {}, Email: {}",
        agent.id,
        agent.name,
        agent.email
    );
    Ok(agent.id)
}

/// Print every agent with its assignment count, newest first.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), CliError> {
    let pool = super::connect().await?;
    let agents = AgentRepository::new(&pool).list_with_counts().await?;

    #[allow(clippy::print_stdout)]
    {
        if agents.is_empty() {
            println!("No agents.");
        }
        for summary in &agents {
            let agent = &summary.agent;
            println!(
                "{:>5}  {:<24} {:<32} {:<16} {} leads",
                agent.id, agent.name, agent.email, agent.phone, summary.assigned_count
            );
        }
    }
    Ok(())
}

/// Delete an agent and the leads assigned to it.
///
/// # Errors
///
/// Returns `CliError::AgentNotFound` if no agent has `email`.
pub async fn delete(email: &str) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let pool = super::connect().await?;
    let agents = AgentRepository::new(&pool);

    let agent = agents
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CliError::AgentNotFound(email.to_string()))?;
    let removed = agents.delete(agent.id).await?;

    tracing::info!(
        "Agent {} ({}) deleted with {} lead(s)",
        agent.id,
        agent.email,
        removed
    );
    Ok(())
}
