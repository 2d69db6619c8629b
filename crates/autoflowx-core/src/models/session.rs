//! Identity-store session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::Principal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub principal_id: Uuid,
    /// SHA-256 of the raw session token, hex-encoded.
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful sign-up: the new principal and the session
/// the identity store opened for it.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub principal: Principal,
    pub session: Session,
    /// Raw session token (returned once, never stored).
    pub token: String,
}

/// Result of a successful password sign-in.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub session: Session,
    /// Raw session token (returned once, never stored).
    pub token: String,
}
