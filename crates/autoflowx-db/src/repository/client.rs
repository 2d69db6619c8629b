//! SurrealDB implementation of [`ClientRepository`].

use autoflowx_core::error::AutoFlowResult;
use autoflowx_core::models::client::{Client, ClientType, CreateClient};
use autoflowx_core::repository::ClientRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ClientRow {
    principal_id: String,
    display_name: String,
    email: String,
    phone: Option<String>,
    company: String,
    client_type: String,
    workshop_id: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClientRow {
    fn try_into_client(self) -> Result<Client, DbError> {
        let client_type: ClientType = self.client_type.parse().map_err(DbError::Corrupt)?;
        Ok(Client {
            principal_id: parse_uuid("principal", &self.principal_id)?,
            display_name: self.display_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            client_type,
            workshop_id: parse_optional_uuid("workshop", self.workshop_id)?,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Client repository.
#[derive(Clone)]
pub struct SurrealClientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealClientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ClientRepository for SurrealClientRepository<C> {
    async fn create(&self, input: CreateClient) -> AutoFlowResult<Client> {
        let id_str = input.principal_id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('client', $id) SET \
                 principal_id = $id, \
                 display_name = $display_name, \
                 email = $email, phone = $phone, \
                 company = $company, client_type = $client_type, \
                 workshop_id = $workshop_id, active = $active",
            )
            .bind(("id", id_str.clone()))
            .bind(("display_name", input.display_name))
            .bind(("email", input.email.trim().to_lowercase()))
            .bind(("phone", input.phone))
            .bind(("company", input.company))
            .bind(("client_type", input.client_type.as_str().to_string()))
            .bind(("workshop_id", input.workshop_id.map(|w| w.to_string())))
            .bind(("active", input.active))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("client", e))?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "client".into(),
            id: id_str,
        })?;

        Ok(row.try_into_client()?)
    }

    async fn get_by_principal_id(&self, principal_id: Uuid) -> AutoFlowResult<Client> {
        let id_str = principal_id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('client', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "client".into(),
            id: id_str,
        })?;

        Ok(row.try_into_client()?)
    }

    async fn get_by_email(&self, email: &str) -> AutoFlowResult<Client> {
        let email = email.trim().to_lowercase();

        let mut result = self
            .db
            .query(
                "SELECT * FROM client WHERE email = $email \
                 ORDER BY created_at ASC LIMIT 1",
            )
            .bind(("email", email.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "client".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_client()?)
    }
}
