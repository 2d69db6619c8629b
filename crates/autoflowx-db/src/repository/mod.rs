//! SurrealDB repository implementations.

mod client;
mod identity;
mod profile;

pub use client::SurrealClientRepository;
pub use identity::{IdentityConfig, SurrealIdentityStore};
pub use profile::SurrealProfileRepository;

use uuid::Uuid;

use crate::error::DbError;

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Corrupt(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_optional_uuid(field: &str, value: Option<String>) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(field, &v)).transpose()
}
