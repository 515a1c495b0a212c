//! Lead distribution commands.
//!
//! # Usage
//!
//! ```bash
//! # Distribute a file; the file is removed afterwards
//! leaddesk leads distribute ./leads.csv
//!
//! # Distribute a copy and keep the original
//! leaddesk leads distribute ./leads.xlsx --keep
//!
//! # Show leads grouped by agent, or one agent's leads
//! leaddesk leads show
//! leaddesk leads show --agent 3
//! ```
//!
//! # Environment Variables
//!
//! - `LEADDESK_UPLOAD_DIR` - Where `--keep` stages its copy (default `uploads`)

use std::path::{Path, PathBuf};

use leaddesk_admin::db::PgStore;
use leaddesk_admin::ingest::FileFormat;
use leaddesk_admin::services::{
    AssignmentQueryService, DistributionCoordinator, DistributionError, UploadedFile,
};
use leaddesk_core::AgentId;

use super::CliError;

/// Split a local lead file across every agent.
///
/// Without `keep` the file itself is consumed. With `keep` it is copied
/// into the upload directory first and only the copy is removed.
///
/// # Errors
///
/// Returns an error if the file cannot be distributed; nothing is stored
/// in that case.
pub async fn distribute(file: &Path, keep: bool) -> Result<(), CliError> {
    // Never consume a file that is not a lead file.
    FileFormat::from_path(file).map_err(DistributionError::from)?;

    let pool = super::connect().await?;

    let upload = if keep {
        let dir = upload_dir();
        tokio::fs::create_dir_all(&dir).await?;
        UploadedFile::stage_copy(&dir, file).await?
    } else {
        UploadedFile::adopt(file.to_owned())
    };

    let coordinator = DistributionCoordinator::new(PgStore::new(pool));
    let summary = coordinator
        .upload_and_distribute(upload)
        .await
        .inspect_err(|e| tracing::error!(kind = %e.kind(), "Distribution failed"))?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Distributed {} lead(s) across {} agent(s):",
            summary.total_records, summary.total_recipients
        );
        for share in &summary.per_recipient_counts {
            println!(
                "  {:<24} {:<32} {}",
                share.recipient.name, share.recipient.email, share.assigned_count
            );
        }
    }
    Ok(())
}

/// Print leads grouped by agent, or the leads of one agent.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn show(agent: Option<i32>) -> Result<(), CliError> {
    let pool = super::connect().await?;
    let queries = AssignmentQueryService::new(PgStore::new(pool));

    #[allow(clippy::print_stdout)]
    {
        if let Some(agent) = agent {
            let leads = queries.list_by_recipient(AgentId::new(agent)).await?;
            if leads.is_empty() {
                println!("Agent {agent} holds no leads.");
            }
            for lead in &leads {
                println!("  {:<24} {:<18} {}", lead.first_name, lead.phone, lead.notes);
            }
        } else {
            let groups = queries.grouped_by_recipient().await?;
            if groups.is_empty() {
                println!("No leads have been distributed.");
            }
            for group in &groups {
                println!(
                    "{} <{}> ({} leads)",
                    group.recipient.name,
                    group.recipient.email,
                    group.items.len()
                );
                for item in &group.items {
                    println!("  {:<24} {:<18} {}", item.first_name, item.phone, item.notes);
                }
            }
        }
    }
    Ok(())
}

fn upload_dir() -> PathBuf {
    std::env::var("LEADDESK_UPLOAD_DIR").map_or_else(|_| PathBuf::from("uploads"), PathBuf::from)
}
