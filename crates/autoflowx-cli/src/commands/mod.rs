//! Command implementations.

pub mod account;
pub mod migrate;

use autoflowx_accounts::ProvisioningError;
use autoflowx_core::error::AutoFlowError;
use autoflowx_db::{DbConfig, DbError, DbManager};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Connect(#[from] surrealdb::Error),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] AutoFlowError),

    #[error("{} ({})", .0, .0.kind())]
    Provisioning(#[from] ProvisioningError),

    #[error("Invalid role: {0}. Valid roles: admin, manager, technician, advisor, client")]
    InvalidRole(String),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

pub(crate) async fn connect(config: &DbConfig) -> Result<DbManager, CommandError> {
    Ok(DbManager::connect(config).await?)
}
