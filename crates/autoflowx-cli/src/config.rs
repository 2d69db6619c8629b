//! CLI configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first.
//!
//! # Environment Variables (all optional)
//!
//! - `AFX_DB_URL` - SurrealDB WebSocket address (default: 127.0.0.1:8000)
//! - `AFX_DB_NAMESPACE` - namespace (default: autoflowx)
//! - `AFX_DB_DATABASE` - database (default: workshop)
//! - `AFX_DB_USERNAME` / `AFX_DB_PASSWORD` - root credentials (default: root/root)
//! - `AFX_PASSWORD_PEPPER` - pepper for principal password hashes
//! - `AFX_SESSION_LIFETIME_SECS` - identity session lifetime (default: 3600)
//! - `AFX_DEFAULT_CREDENTIAL` - initial password of provisioned accounts
//! - `AFX_EXISTENCE_CHECK` - `probe` (default) or `lookup`

use autoflowx_accounts::{ExistenceCheck, ProvisioningConfig};
use autoflowx_db::DbConfig;
use autoflowx_db::repository::IdentityConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db: DbConfig,
    pub identity: IdentityConfig,
    pub provisioning: ProvisioningConfig,
}

impl CliConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = get("AFX_DB_URL") {
            config.db.url = v;
        }
        if let Some(v) = get("AFX_DB_NAMESPACE") {
            config.db.namespace = v;
        }
        if let Some(v) = get("AFX_DB_DATABASE") {
            config.db.database = v;
        }
        if let Some(v) = get("AFX_DB_USERNAME") {
            config.db.username = v;
        }
        if let Some(v) = get("AFX_DB_PASSWORD") {
            config.db.password = v;
        }

        config.identity.pepper = get("AFX_PASSWORD_PEPPER").filter(|p| !p.is_empty());
        if let Some(v) = get("AFX_SESSION_LIFETIME_SECS") {
            config.identity.session_lifetime_secs = v
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("AFX_SESSION_LIFETIME_SECS", format!("{e}")))?;
        }

        if let Some(v) = get("AFX_DEFAULT_CREDENTIAL") {
            config.provisioning.default_credential = v;
        }
        if let Some(v) = get("AFX_EXISTENCE_CHECK") {
            config.provisioning.existence_check = match v.to_lowercase().as_str() {
                "probe" => ExistenceCheck::Probe,
                "lookup" => ExistenceCheck::Lookup,
                other => {
                    return Err(ConfigError::InvalidEnvVar(
                        "AFX_EXISTENCE_CHECK",
                        format!("expected probe or lookup, got {other}"),
                    ));
                }
            };
        }

        Ok(config)
    }
}
