//! Client domain model.
//!
//! A client row exists for accounts whose profile carries the customer
//! role. It links back to the principal, not to the profile, and
//! duplicates the contact attributes the vehicle and order screens use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    #[default]
    Individual,
    Business,
}

impl ClientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Business => "business",
        }
    }
}

impl std::str::FromStr for ClientType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "business" => Ok(Self::Business),
            _ => Err(format!("invalid client type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub principal_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: String,
    pub client_type: ClientType,
    pub workshop_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClient {
    pub principal_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: String,
    pub client_type: ClientType,
    pub workshop_id: Option<Uuid>,
    pub active: bool,
}

/// `"{first} {last}"` trimmed, or `email` when both names are blank.
pub fn display_name(first_name: &str, last_name: &str, email: &str) -> String {
    let name = format!("{} {}", first_name.trim(), last_name.trim());
    let name = name.trim();
    if name.is_empty() {
        email.to_string()
    } else {
        name.to_string()
    }
}
