//! SurrealDB implementation of [`IdentityStore`].
//!
//! Principals are stored in `principal` with an Argon2id password hash;
//! sessions in `identity_session` with the SHA-256 of their opaque
//! token. Unknown emails are reported as `NotFound`, distinct from a
//! wrong password, which the provisioning existence probe relies on.

use autoflowx_core::error::AutoFlowResult;
use autoflowx_core::models::principal::{CreatePrincipal, Principal};
use autoflowx_core::models::session::{Session, SignIn, SignUp};
use autoflowx_core::repository::IdentityStore;
use chrono::{DateTime, Duration, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, warn};
use uuid::Uuid;

use super::parse_uuid;
use crate::credentials::{
    generate_session_token, hash_password, hash_session_token, normalize_email, verify_password,
};
use crate::error::DbError;

/// Identity store configuration.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Session lifetime in seconds (default: 3600 = 1 hour).
    pub session_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before hashing.
    pub pepper: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: 3600,
            pepper: None,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct PrincipalRow {
    email: String,
    password_hash: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PrincipalRowWithId {
    record_id: String,
    email: String,
    password_hash: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PrincipalRow {
    fn into_principal(self, id: Uuid) -> Principal {
        Principal {
            id,
            email: self.email,
            password_hash: self.password_hash,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl PrincipalRowWithId {
    fn try_into_principal(self) -> Result<Principal, DbError> {
        Ok(Principal {
            id: parse_uuid("principal", &self.record_id)?,
            email: self.email,
            password_hash: self.password_hash,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct SessionRow {
    principal_id: String,
    token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    principal_id: String,
    token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self, id: Uuid) -> Result<Session, DbError> {
        Ok(Session {
            id,
            principal_id: parse_uuid("principal", &self.principal_id)?,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        Ok(Session {
            id: parse_uuid("session", &self.record_id)?,
            principal_id: parse_uuid("principal", &self.principal_id)?,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the identity store.
#[derive(Clone)]
pub struct SurrealIdentityStore<C: Connection> {
    db: Surreal<C>,
    config: IdentityConfig,
}

impl<C: Connection> SurrealIdentityStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self::with_config(db, IdentityConfig::default())
    }

    pub fn with_config(db: Surreal<C>, config: IdentityConfig) -> Self {
        Self { db, config }
    }

    async fn find_by_email(&self, email: &str) -> Result<Principal, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM principal \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await?;

        let rows: Vec<PrincipalRowWithId> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: format!("email={email}"),
        })?;

        row.try_into_principal()
    }

    /// Open a session for `principal_id` and return it with its raw token.
    async fn open_session(&self, principal_id: Uuid) -> Result<(Session, String), DbError> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let token = generate_session_token();
        let expires_at =
            Utc::now() + Duration::seconds(self.config.session_lifetime_secs as i64);

        let result = self
            .db
            .query(
                "CREATE type::record('identity_session', $id) SET \
                 principal_id = $principal_id, \
                 token_hash = $token_hash, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("principal_id", principal_id.to_string()))
            .bind(("token_hash", hash_session_token(&token)))
            .bind(("expires_at", expires_at))
            .await?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("identity_session", e))?;

        let rows: Vec<SessionRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "identity_session".into(),
            id: id_str,
        })?;

        Ok((row.into_session(id)?, token))
    }

    async fn remove_principal(&self, id: Uuid) -> Result<(), DbError> {
        self.db
            .query(
                "DELETE identity_session WHERE principal_id = $id; \
                 DELETE type::record('principal', $id);",
            )
            .bind(("id", id.to_string()))
            .await?
            .check()
            .map_err(|e| DbError::from_statement("principal", e))?;

        Ok(())
    }
}

impl<C: Connection> IdentityStore for SurrealIdentityStore<C> {
    async fn sign_up(&self, input: CreatePrincipal) -> AutoFlowResult<SignUp> {
        let email = normalize_email(&input.email)?;

        // The unique index still guards a concurrent sign-up; this check
        // only gives the common case a clean error.
        match self.find_by_email(&email).await {
            Ok(_) => {
                return Err(DbError::AlreadyExists {
                    entity: "principal".into(),
                }
                .into());
            }
            Err(DbError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let password_hash = hash_password(&input.password, self.config.pepper.as_deref())?;
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('principal', $id) SET \
                 email = $email, \
                 password_hash = $password_hash, \
                 metadata = $metadata",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", email))
            .bind(("password_hash", password_hash))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("principal", e))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;
        let principal = row.into_principal(id);

        // A principal without its first session is not a completed sign-up.
        let (session, token) = match self.open_session(principal.id).await {
            Ok(opened) => opened,
            Err(e) => {
                if let Err(cleanup) = self.remove_principal(principal.id).await {
                    warn!(
                        principal_id = %principal.id,
                        error = %cleanup,
                        "Failed to remove principal after session error"
                    );
                }
                return Err(e.into());
            }
        };
        debug!(principal_id = %principal.id, session_id = %session.id, "Principal signed up");

        Ok(SignUp {
            principal,
            session,
            token,
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AutoFlowResult<SignIn> {
        let email = normalize_email(email)?;
        let principal = self.find_by_email(&email).await?;

        let valid = verify_password(
            password,
            &principal.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(DbError::InvalidCredentials.into());
        }

        let (session, token) = self.open_session(principal.id).await?;
        Ok(SignIn { session, token })
    }

    async fn sign_out(&self, session_id: Uuid) -> AutoFlowResult<()> {
        self.db
            .query("DELETE type::record('identity_session', $id)")
            .bind(("id", session_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("identity_session", e))?;

        Ok(())
    }

    async fn delete_principal(&self, id: Uuid) -> AutoFlowResult<()> {
        Ok(self.remove_principal(id).await?)
    }

    async fn get_principal_by_id(&self, id: Uuid) -> AutoFlowResult<Principal> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('principal', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id))
    }

    async fn get_principal_by_email(&self, email: &str) -> AutoFlowResult<Principal> {
        let email = normalize_email(email)?;
        Ok(self.find_by_email(&email).await?)
    }

    async fn list_sessions(&self, principal_id: Uuid) -> AutoFlowResult<Vec<Session>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM identity_session \
                 WHERE principal_id = $principal_id AND expires_at > time::now() \
                 ORDER BY created_at ASC",
            )
            .bind(("principal_id", principal_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;

        let sessions = rows
            .into_iter()
            .map(|row| row.try_into_session())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(sessions)
    }
}
