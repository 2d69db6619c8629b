//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings; profile and client records use the principal id as their
//! record id, so a second row for the same principal cannot be created.

use std::collections::BTreeSet;

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct AppliedVersion {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "identity_and_accounts",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "workshop_indexes",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1: identity store and account tables
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Principals (identity store)
-- =======================================================================
DEFINE TABLE principal SCHEMAFULL;
DEFINE FIELD email ON TABLE principal TYPE string;
DEFINE FIELD password_hash ON TABLE principal TYPE string;
DEFINE FIELD metadata ON TABLE principal TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE principal TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE principal TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_principal_email ON TABLE principal \
    COLUMNS email UNIQUE;

-- =======================================================================
-- Identity sessions
-- =======================================================================
DEFINE TABLE identity_session SCHEMAFULL;
DEFINE FIELD principal_id ON TABLE identity_session TYPE string;
DEFINE FIELD token_hash ON TABLE identity_session TYPE string;
DEFINE FIELD expires_at ON TABLE identity_session TYPE datetime;
DEFINE FIELD created_at ON TABLE identity_session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_identity_session_token ON TABLE identity_session \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_identity_session_principal ON TABLE identity_session \
    COLUMNS principal_id;

-- =======================================================================
-- Profiles (one per principal, record id = principal id)
-- =======================================================================
DEFINE TABLE profile SCHEMAFULL;
DEFINE FIELD principal_id ON TABLE profile TYPE string;
DEFINE FIELD first_name ON TABLE profile TYPE string;
DEFINE FIELD last_name ON TABLE profile TYPE string;
DEFINE FIELD email ON TABLE profile TYPE string;
DEFINE FIELD phone ON TABLE profile TYPE option<string>;
DEFINE FIELD role ON TABLE profile TYPE string \
    ASSERT $value IN ['admin', 'manager', 'technician', 'advisor', \
    'client'];
DEFINE FIELD workshop_id ON TABLE profile TYPE option<string>;
DEFINE FIELD active ON TABLE profile TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE profile TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE profile TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_profile_principal ON TABLE profile \
    COLUMNS principal_id UNIQUE;
DEFINE INDEX idx_profile_email ON TABLE profile COLUMNS email;

-- =======================================================================
-- Clients (customer-role accounts, record id = principal id)
-- =======================================================================
DEFINE TABLE client SCHEMAFULL;
DEFINE FIELD principal_id ON TABLE client TYPE string;
DEFINE FIELD display_name ON TABLE client TYPE string;
DEFINE FIELD email ON TABLE client TYPE string;
DEFINE FIELD phone ON TABLE client TYPE option<string>;
DEFINE FIELD company ON TABLE client TYPE string DEFAULT '';
DEFINE FIELD client_type ON TABLE client TYPE string \
    ASSERT $value IN ['individual', 'business'];
DEFINE FIELD workshop_id ON TABLE client TYPE option<string>;
DEFINE FIELD active ON TABLE client TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_client_principal ON TABLE client \
    COLUMNS principal_id UNIQUE;
DEFINE INDEX idx_client_email ON TABLE client COLUMNS email;
";

// -----------------------------------------------------------------------
// Schema v2: workshop lookups
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
DEFINE INDEX idx_profile_workshop ON TABLE profile COLUMNS workshop_id;
DEFINE INDEX idx_client_workshop ON TABLE client COLUMNS workshop_id;
";

// -----------------------------------------------------------------------
// Runner
// -----------------------------------------------------------------------

/// Apply every migration not yet recorded in `_migration`, in version
/// order, and return the versions applied by this call.
///
/// A migration is recorded only after its DDL succeeded, so a failed
/// run is picked up again from that migration.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<Vec<u32>, DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let recorded = recorded_versions(db).await?;
    let mut applied = Vec::new();

    for migration in MIGRATIONS.iter().filter(|m| !recorded.contains(&m.version)) {
        apply(db, migration).await?;
        applied.push(migration.version);
    }

    if applied.is_empty() {
        info!("Schema is up to date");
    }
    Ok(applied)
}

async fn recorded_versions<C: Connection>(db: &Surreal<C>) -> Result<BTreeSet<u32>, DbError> {
    let mut result = db.query("SELECT version FROM _migration").await?;
    let rows: Vec<AppliedVersion> = result.take(0)?;
    Ok(rows.into_iter().map(|r| r.version).collect())
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    let failed = |stage: &str, e: surrealdb::Error| {
        DbError::Migration(format!(
            "v{} '{}' {stage}: {e}",
            migration.version, migration.name
        ))
    };

    db.query(migration.sql)
        .await?
        .check()
        .map_err(|e| failed("failed", e))?;

    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| failed("could not be recorded", e))?;

    info!(version = migration.version, name = migration.name, "Migration applied");
    Ok(())
}
