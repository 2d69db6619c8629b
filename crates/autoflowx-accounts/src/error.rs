//! Provisioning error types.

use autoflowx_core::error::AutoFlowError;
use serde::Serialize;
use thiserror::Error;

use crate::report::AccountTable;

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("an account already exists for {email}")]
    AlreadyExists { email: String },

    #[error("identity store error: {0}")]
    IdentityStore(String),

    #[error("profile write failed: {0}")]
    ProfileWrite(String),

    #[error("client write failed: {0}")]
    ClientWrite(String),

    #[error("no identity exists for {email}")]
    NoIdentity { email: String },

    #[error("{table} lookup failed: {message}")]
    Lookup {
        table: AccountTable,
        message: String,
    },
}

/// Stable, caller-facing classification of a [`ProvisioningError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    AlreadyExists,
    IdentityStoreError,
    ProfileWriteError,
    ClientWriteError,
    NoIdentity,
    LookupError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::IdentityStoreError => "IDENTITY_STORE_ERROR",
            Self::ProfileWriteError => "PROFILE_WRITE_ERROR",
            Self::ClientWriteError => "CLIENT_WRITE_ERROR",
            Self::NoIdentity => "NO_IDENTITY",
            Self::LookupError => "LOOKUP_ERROR",
        };
        f.write_str(s)
    }
}

impl ProvisioningError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::IdentityStore(_) => ErrorKind::IdentityStoreError,
            Self::ProfileWrite(_) => ErrorKind::ProfileWriteError,
            Self::ClientWrite(_) => ErrorKind::ClientWriteError,
            Self::NoIdentity { .. } => ErrorKind::NoIdentity,
            Self::Lookup { .. } => ErrorKind::LookupError,
        }
    }
}

impl From<ProvisioningError> for AutoFlowError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::AlreadyExists { .. } => AutoFlowError::AlreadyExists {
                entity: "account".into(),
            },
            ProvisioningError::NoIdentity { email } => AutoFlowError::NotFound {
                entity: "principal".into(),
                id: format!("email={email}"),
            },
            other => AutoFlowError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_display_as_screaming_snake_case() {
        let err = ProvisioningError::ClientWrite("boom".into());
        assert_eq!(err.kind().to_string(), "CLIENT_WRITE_ERROR");
        assert_eq!(
            serde_json::to_value(err.kind()).unwrap(),
            serde_json::json!("CLIENT_WRITE_ERROR")
        );
    }

    #[test]
    fn message_carries_backend_detail() {
        let err = ProvisioningError::ProfileWrite("index violation".into());
        assert!(err.to_string().contains("index violation"));
    }

    #[test]
    fn no_identity_maps_to_not_found() {
        let err: AutoFlowError = ProvisioningError::NoIdentity {
            email: "ana@x.com".into(),
        }
        .into();
        assert!(err.is_not_found());
    }
}
