//! LeadDesk CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! leaddesk migrate
//!
//! # Create an admin who can log in to the API
//! leaddesk admin create -e admin@example.com -n "Admin Name" -p 'long password'
//!
//! # Manage agents
//! leaddesk agent create -n "Sarah Lee" -e sarah@example.com -p "+1 201 555 0123"
//! leaddesk agent list
//! leaddesk agent delete -e sarah@example.com
//!
//! # Distribute a lead file and inspect the result
//! leaddesk leads distribute ./leads.csv --keep
//! leaddesk leads show --agent 3
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "leaddesk")]
#[command(author, version, about = "LeadDesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage agents
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },
    /// Distribute and inspect leads
    Leads {
        #[command(subcommand)]
        action: LeadsAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Login password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum AgentAction {
    /// Create a new agent
    Create {
        /// Agent display name
        #[arg(short, long)]
        name: String,

        /// Agent email address
        #[arg(short, long)]
        email: String,

        /// Phone number with country code
        #[arg(short, long)]
        phone: String,
    },
    /// List agents with their lead counts
    List,
    /// Delete an agent and its leads
    Delete {
        /// Agent email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum LeadsAction {
    /// Split a .csv, .xlsx or .xls file across all agents
    Distribute {
        /// Lead file
        file: PathBuf,

        /// Distribute a copy and leave FILE in place
        #[arg(long)]
        keep: bool,
    },
    /// Show leads grouped by agent
    Show {
        /// Only this agent's leads
        #[arg(long)]
        agent: Option<i32>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
        },
        Commands::Agent { action } => match action {
            AgentAction::Create { name, email, phone } => {
                commands::agent::create(&name, &email, &phone).await?;
            }
            AgentAction::List => commands::agent::list().await?,
            AgentAction::Delete { email } => commands::agent::delete(&email).await?,
        },
        Commands::Leads { action } => match action {
            LeadsAction::Distribute { file, keep } => {
                commands::leads::distribute(&file, keep).await?;
            }
            LeadsAction::Show { agent } => commands::leads::show(agent).await?,
        },
    }
    Ok(())
}
