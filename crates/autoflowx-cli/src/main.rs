//! AutoFlowX CLI: schema migrations and account provisioning.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending schema migrations
//! afx migrate
//!
//! # Provision an account (role defaults to client)
//! afx account create --first-name Ana --last-name Lopez --email ana@x.com
//!
//! # Check and heal a partially provisioned account
//! afx account validate --email ana@x.com
//! afx account repair --email ana@x.com
//!
//! # Inspect stored rows
//! afx account show --email ana@x.com
//! afx account list --workshop-id 7f9c0d1e-2a3b-4c5d-8e6f-0a1b2c3d4e5f
//! ```
//!
//! Connection settings come from the environment, see [`config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "afx")]
#[command(author, version, about = "AutoFlowX admin tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Provision, validate and repair accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create principal, profile and (for clients) client records
    Create {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        phone: Option<String>,

        /// Role (`admin`, `manager`, `technician`, `advisor`, `client`)
        #[arg(short, long)]
        role: Option<String>,

        #[arg(short, long)]
        workshop_id: Option<uuid::Uuid>,
    },
    /// Report which records of an account are missing
    Validate {
        #[arg(short, long)]
        email: String,
    },
    /// Backfill missing profile/client records
    Repair {
        #[arg(short, long)]
        email: String,
    },
    /// Print the profile and client rows stored under an email
    Show {
        #[arg(short, long)]
        email: String,
    },
    /// List the profiles assigned to a workshop
    List {
        #[arg(short, long)]
        workshop_id: uuid::Uuid,
    },
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let config = config::CliConfig::from_env()?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&config).await?,
        Commands::Account { action } => match action {
            AccountAction::Create {
                first_name,
                last_name,
                email,
                phone,
                role,
                workshop_id,
            } => {
                commands::account::create(
                    &config,
                    commands::account::CreateArgs {
                        first_name,
                        last_name,
                        email,
                        phone,
                        role,
                        workshop_id,
                    },
                )
                .await?;
            }
            AccountAction::Validate { email } => commands::account::validate(&config, &email).await?,
            AccountAction::Repair { email } => commands::account::repair(&config, &email).await?,
            AccountAction::Show { email } => commands::account::show(&config, &email).await?,
            AccountAction::List { workshop_id } => {
                commands::account::list(&config, workshop_id).await?
            }
        },
    }
    Ok(())
}
