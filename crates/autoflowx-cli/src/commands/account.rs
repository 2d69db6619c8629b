//! Account provisioning commands.
//!
//! Results are written to stdout as pretty-printed JSON; logs go to
//! stderr.

use autoflowx_accounts::AccountService;
use autoflowx_core::error::AutoFlowResult;
use autoflowx_core::models::client::Client as ClientRecord;
use autoflowx_core::models::profile::{Profile, Role};
use autoflowx_core::repository::{ClientRepository, ProfileRepository};
use autoflowx_db::DbManager;
use autoflowx_db::repository::{
    SurrealClientRepository, SurrealIdentityStore, SurrealProfileRepository,
};
use serde::Serialize;
use surrealdb::engine::remote::ws::Client;
use uuid::Uuid;

use crate::commands::{CommandError, connect};
use crate::config::CliConfig;

type Service = AccountService<
    SurrealIdentityStore<Client>,
    SurrealProfileRepository<Client>,
    SurrealClientRepository<Client>,
>;

pub struct CreateArgs {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub workshop_id: Option<Uuid>,
}

/// Table rows stored under one email, regardless of whether a
/// principal still owns them.
#[derive(Serialize)]
struct AccountRows {
    profile: Option<Profile>,
    client: Option<ClientRecord>,
}

fn service(db: &DbManager, config: &CliConfig) -> Service {
    AccountService::new(
        db.identity_store(config.identity.clone()),
        db.profiles(),
        db.clients(),
        config.provisioning.clone(),
    )
}

fn print_json(value: &impl Serialize) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn found<T>(result: AutoFlowResult<T>) -> Result<Option<T>, CommandError> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn create(config: &CliConfig, args: CreateArgs) -> Result<(), CommandError> {
    let role = args
        .role
        .as_deref()
        .map(|r| r.parse::<Role>().map_err(|_| CommandError::InvalidRole(r.to_owned())))
        .transpose()?;

    let db = connect(&config.db).await?;
    let account = service(&db, config)
        .create_account(autoflowx_accounts::CreateAccount {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            role,
            workshop_id: args.workshop_id,
        })
        .await?;

    tracing::warn!(
        principal_id = %account.principal_id,
        "Account uses the default credential; ask the user to change it"
    );
    print_json(&account)
}

pub async fn validate(config: &CliConfig, email: &str) -> Result<(), CommandError> {
    let db = connect(&config.db).await?;
    let validation = service(&db, config).validate_account(email).await?;
    print_json(&validation)
}

pub async fn repair(config: &CliConfig, email: &str) -> Result<(), CommandError> {
    let db = connect(&config.db).await?;
    let report = service(&db, config).repair_account(email).await?;
    print_json(&report)
}

/// Print the profile and client rows filed under `email`. Unlike
/// `validate`, this also finds rows whose principal is gone.
pub async fn show(config: &CliConfig, email: &str) -> Result<(), CommandError> {
    let db = connect(&config.db).await?;
    let rows = AccountRows {
        profile: found(db.profiles().get_by_email(email).await)?,
        client: found(db.clients().get_by_email(email).await)?,
    };
    print_json(&rows)
}

pub async fn list(config: &CliConfig, workshop_id: Uuid) -> Result<(), CommandError> {
    let db = connect(&config.db).await?;
    let profiles = db.profiles().list_by_workshop(workshop_id).await?;
    tracing::info!(%workshop_id, count = profiles.len(), "Listed workshop profiles");
    print_json(&profiles)
}

#[cfg(test)]
mod tests {
    use autoflowx_core::error::AutoFlowError;

    use super::*;

    #[test]
    fn found_treats_not_found_as_absent() {
        let missing: AutoFlowResult<u8> = Err(AutoFlowError::NotFound {
            entity: "profile".into(),
            id: "email=ana@x.com".into(),
        });
        assert!(found(missing).unwrap().is_none());
        assert_eq!(found(Ok(7u8)).unwrap(), Some(7));

        let broken: AutoFlowResult<u8> = Err(AutoFlowError::Database("down".into()));
        assert!(matches!(found(broken), Err(CommandError::Lookup(_))));
    }
}
