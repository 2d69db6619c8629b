//! SurrealDB implementation of [`ProfileRepository`].

use autoflowx_core::error::AutoFlowResult;
use autoflowx_core::models::profile::{CreateProfile, Profile, Role};
use autoflowx_core::repository::ProfileRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProfileRow {
    principal_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    role: String,
    workshop_id: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn try_into_profile(self) -> Result<Profile, DbError> {
        let role: Role = self.role.parse().map_err(DbError::Corrupt)?;
        Ok(Profile {
            principal_id: parse_uuid("principal", &self.principal_id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            role,
            workshop_id: parse_optional_uuid("workshop", self.workshop_id)?,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Profile repository.
#[derive(Clone)]
pub struct SurrealProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProfileRepository for SurrealProfileRepository<C> {
    async fn create(&self, input: CreateProfile) -> AutoFlowResult<Profile> {
        let id_str = input.principal_id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('profile', $id) SET \
                 principal_id = $id, \
                 first_name = $first_name, last_name = $last_name, \
                 email = $email, phone = $phone, \
                 role = $role, workshop_id = $workshop_id, \
                 active = $active",
            )
            .bind(("id", id_str.clone()))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", input.email.trim().to_lowercase()))
            .bind(("phone", input.phone))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("workshop_id", input.workshop_id.map(|w| w.to_string())))
            .bind(("active", input.active))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("profile", e))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: id_str,
        })?;

        Ok(row.try_into_profile()?)
    }

    async fn get_by_principal_id(&self, principal_id: Uuid) -> AutoFlowResult<Profile> {
        let id_str = principal_id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('profile', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: id_str,
        })?;

        Ok(row.try_into_profile()?)
    }

    async fn get_by_email(&self, email: &str) -> AutoFlowResult<Profile> {
        let email = email.trim().to_lowercase();

        let mut result = self
            .db
            .query(
                "SELECT * FROM profile WHERE email = $email \
                 ORDER BY created_at ASC LIMIT 1",
            )
            .bind(("email", email.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_profile()?)
    }

    async fn list_by_workshop(&self, workshop_id: Uuid) -> AutoFlowResult<Vec<Profile>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM profile WHERE workshop_id = $workshop_id \
                 ORDER BY created_at ASC",
            )
            .bind(("workshop_id", workshop_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;

        let profiles = rows
            .into_iter()
            .map(|row| row.try_into_profile())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(profiles)
    }
}
