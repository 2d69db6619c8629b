//! SurrealDB connection and the repositories built on top of it.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::{
    IdentityConfig, SurrealClientRepository, SurrealIdentityStore, SurrealProfileRepository,
};
use crate::schema::run_migrations;

/// Where the workshop database lives and how to authenticate to it.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket endpoint, without scheme (e.g. `127.0.0.1:8000`).
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials. Account provisioning deletes principals, which
    /// needs more than a record-level user.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "autoflowx".into(),
            database: "workshop".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// An authenticated connection to the workshop database.
///
/// Cloning is cheap; every repository handed out shares the same
/// underlying client.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to workshop database"
        );

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace).use_db(&config.database).await?;

        Ok(Self { db })
    }

    /// Apply pending schema migrations, returning the versions applied.
    pub async fn migrate(&self) -> Result<Vec<u32>, DbError> {
        run_migrations(&self.db).await
    }

    pub fn identity_store(&self, config: IdentityConfig) -> SurrealIdentityStore<Client> {
        SurrealIdentityStore::with_config(self.db.clone(), config)
    }

    pub fn profiles(&self) -> SurrealProfileRepository<Client> {
        SurrealProfileRepository::new(self.db.clone())
    }

    pub fn clients(&self) -> SurrealClientRepository<Client> {
        SurrealClientRepository::new(self.db.clone())
    }
}
