//! Schema migration command.

use crate::commands::{CommandError, connect};
use crate::config::CliConfig;

pub async fn run(config: &CliConfig) -> Result<(), CommandError> {
    let applied = connect(&config.db).await?.migrate().await?;
    tracing::info!(?applied, "Migrations up to date");
    Ok(())
}
