//! Principal domain model.
//!
//! A principal is a credentialed identity in the identity store. Its id
//! anchors the profile and client rows of the same account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    /// Lowercased, trimmed. Unique across all principals.
    pub email: String,
    pub password_hash: String,
    /// Auxiliary sign-up metadata, see [`PrincipalMetadata`].
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Decode the sign-up metadata. Malformed metadata yields the empty
    /// default rather than an error.
    pub fn sign_up_metadata(&self) -> PrincipalMetadata {
        serde_json::from_value(self.metadata.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrincipal {
    pub email: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub metadata: Option<serde_json::Value>,
}

/// Attributes attached to a principal at sign-up time.
///
/// Every field is optional: principals created outside the provisioning
/// flow may carry none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workshop_id: Option<Uuid>,
}

impl PrincipalMetadata {
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }
}
