//! Database-specific error types and conversions.

use autoflowx_core::error::AutoFlowError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),
}

impl DbError {
    /// Classify an error raised by a statement in a checked response.
    ///
    /// Unique-index and record-id collisions become `AlreadyExists`.
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        if msg.contains("already contains") || msg.contains("already exists") {
            DbError::AlreadyExists {
                entity: entity.into(),
            }
        } else {
            DbError::Query(msg)
        }
    }
}

impl From<DbError> for AutoFlowError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AutoFlowError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => AutoFlowError::AlreadyExists { entity },
            DbError::InvalidCredentials => AutoFlowError::AuthenticationFailed {
                reason: "invalid credentials".into(),
            },
            DbError::Validation(message) => AutoFlowError::Validation { message },
            DbError::Crypto(msg) => AutoFlowError::Crypto(msg),
            other => AutoFlowError::Database(other.to_string()),
        }
    }
}
