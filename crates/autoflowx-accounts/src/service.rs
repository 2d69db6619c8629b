//! Account service: provisioning, integrity validation and repair.
//!
//! An account spans three stores keyed on one principal id: the
//! identity store, the profile table and (for customer-role accounts)
//! the client table. Writes are sequential, not transactional:
//!
//! - a failed profile insert deletes the new principal again;
//! - a failed client insert keeps principal and profile and leaves the
//!   gap to [`AccountService::repair_account`];
//! - the session opened by sign-up is always signed out before
//!   `create_account` returns.

use std::collections::BTreeSet;

use autoflowx_core::error::AutoFlowError;
use autoflowx_core::models::client::{self, Client, ClientType, CreateClient};
use autoflowx_core::models::principal::{CreatePrincipal, Principal, PrincipalMetadata};
use autoflowx_core::models::profile::{CreateProfile, Profile, Role};
use autoflowx_core::repository::{ClientRepository, IdentityStore, ProfileRepository};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{ExistenceCheck, ProvisioningConfig};
use crate::error::ProvisioningError;
use crate::report::{AccountTable, AccountValidation, ProvisionedAccount, RepairReport};

/// Input for the provisioning flow.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Defaults to the customer role.
    pub role: Option<Role>,
    pub workshop_id: Option<Uuid>,
}

/// Account service.
///
/// Generic over repository implementations so that the provisioning
/// layer has no dependency on the database crate.
pub struct AccountService<I: IdentityStore, P: ProfileRepository, C: ClientRepository> {
    identity: I,
    profiles: P,
    clients: C,
    config: ProvisioningConfig,
}

impl<I, P, C> AccountService<I, P, C>
where
    I: IdentityStore,
    P: ProfileRepository,
    C: ClientRepository,
{
    pub fn new(identity: I, profiles: P, clients: C, config: ProvisioningConfig) -> Self {
        Self {
            identity,
            profiles,
            clients,
            config,
        }
    }

    /// Provision a principal, its profile and, for the customer role,
    /// its client row.
    pub async fn create_account(
        &self,
        input: CreateAccount,
    ) -> Result<ProvisionedAccount, ProvisioningError> {
        let email = input.email.trim().to_string();
        let role = input.role.unwrap_or_default();

        // 1. Refuse known emails before writing anything.
        self.ensure_not_registered(&email).await?;

        // 2. Create the principal.
        let metadata = PrincipalMetadata {
            role: Some(role.as_str().into()),
            first_name: Some(input.first_name.clone()),
            last_name: Some(input.last_name.clone()),
            phone: input.phone.clone(),
            workshop_id: input.workshop_id,
        };
        let signed_up = self
            .identity
            .sign_up(CreatePrincipal {
                email: email.clone(),
                password: self.config.default_credential.clone(),
                metadata: Some(metadata.to_value()),
            })
            .await
            .map_err(|e| match e {
                AutoFlowError::AlreadyExists { .. } => ProvisioningError::AlreadyExists {
                    email: email.clone(),
                },
                other => ProvisioningError::IdentityStore(other.to_string()),
            })?;
        let principal_id = signed_up.principal.id;
        info!(%principal_id, email = %signed_up.principal.email, %role, "Principal created");

        // 3 + 4. Profile and (conditionally) client rows.
        let outcome = self
            .insert_account_rows(&signed_up.principal, &input, role)
            .await;

        // 5. Never leave the sign-up session behind, whatever happened.
        self.end_session(signed_up.session.id, principal_id).await;

        match outcome {
            Ok((profile, client)) => {
                info!(%principal_id, has_client = client.is_some(), "Account provisioned");
                Ok(ProvisionedAccount {
                    principal_id,
                    profile,
                    client,
                })
            }
            Err(err @ ProvisioningError::ProfileWrite(_)) => {
                self.compensate_principal(principal_id).await;
                Err(err)
            }
            Err(err) => {
                warn!(%principal_id, error = %err, "Account provisioned without client row");
                Err(err)
            }
        }
    }

    /// Check that every row of the account for `email` exists.
    ///
    /// Never writes. A missing principal is reported as
    /// `missing = {identity}` only.
    pub async fn validate_account(
        &self,
        email: &str,
    ) -> Result<AccountValidation, ProvisioningError> {
        let principal = match self.identity.get_principal_by_email(email).await {
            Ok(p) => p,
            // A malformed email cannot have a principal either.
            Err(AutoFlowError::NotFound { .. } | AutoFlowError::Validation { .. }) => {
                return Ok(AccountValidation::without_identity());
            }
            Err(e) => return Err(lookup_error(AccountTable::Identity, e)),
        };

        let mut missing = BTreeSet::new();

        let profile = self.find_profile(principal.id).await?;
        let client = match &profile {
            None => {
                missing.insert(AccountTable::Profile);
                None
            }
            Some(profile) if profile.role.is_customer() => {
                let client = self.find_client(principal.id).await?;
                if client.is_none() {
                    missing.insert(AccountTable::Client);
                }
                client
            }
            Some(_) => None,
        };

        Ok(AccountValidation::new(principal, profile, client, missing))
    }

    /// Backfill the rows `validate_account` reports missing.
    ///
    /// Existing rows are never modified, so running this on a valid
    /// account is a no-op.
    pub async fn repair_account(&self, email: &str) -> Result<RepairReport, ProvisioningError> {
        let validation = self.validate_account(email).await?;
        let Some(principal) = validation.principal else {
            return Err(ProvisioningError::NoIdentity {
                email: email.trim().to_string(),
            });
        };

        let mut backfilled = BTreeSet::new();

        let profile = match validation.profile {
            Some(profile) => profile,
            None => {
                let (profile, inserted) = self.backfill_profile(&principal).await?;
                if inserted {
                    backfilled.insert(AccountTable::Profile);
                }
                profile
            }
        };

        let client = if !profile.role.is_customer() {
            None
        } else if let Some(client) = validation.client {
            Some(client)
        } else {
            // With a freshly backfilled profile the client table was
            // never consulted.
            let existing = if validation.missing.contains(&AccountTable::Client) {
                None
            } else {
                self.find_client(principal.id).await?
            };
            match existing {
                Some(client) => Some(client),
                None => {
                    let (client, inserted) = self.backfill_client(&profile).await?;
                    if inserted {
                        backfilled.insert(AccountTable::Client);
                    }
                    Some(client)
                }
            }
        };

        info!(
            principal_id = %principal.id,
            backfilled = ?backfilled,
            "Account repair finished"
        );

        Ok(RepairReport {
            principal_id: principal.id,
            backfilled,
            profile,
            client,
        })
    }

    async fn ensure_not_registered(&self, email: &str) -> Result<(), ProvisioningError> {
        let exists = match self.config.existence_check {
            ExistenceCheck::Probe => {
                match self
                    .identity
                    .sign_in_with_password(email, &self.config.probe_credential)
                    .await
                {
                    Err(AutoFlowError::AuthenticationFailed { .. }) => true,
                    Err(AutoFlowError::NotFound { .. }) => false,
                    Ok(signed_in) => {
                        // The probe password worked; the account exists
                        // and the session it opened must not survive.
                        self.end_session(signed_in.session.id, signed_in.session.principal_id)
                            .await;
                        true
                    }
                    Err(e) => {
                        warn!(%email, error = %e, "Existence probe inconclusive, proceeding");
                        false
                    }
                }
            }
            ExistenceCheck::Lookup => match self.identity.get_principal_by_email(email).await {
                Ok(_) => true,
                Err(AutoFlowError::NotFound { .. }) => false,
                Err(e) => {
                    warn!(%email, error = %e, "Existence lookup failed, proceeding");
                    false
                }
            },
        };

        if exists {
            info!(%email, "Refusing to provision an existing account");
            return Err(ProvisioningError::AlreadyExists {
                email: email.to_string(),
            });
        }
        Ok(())
    }

    async fn insert_account_rows(
        &self,
        principal: &Principal,
        input: &CreateAccount,
        role: Role,
    ) -> Result<(Profile, Option<Client>), ProvisioningError> {
        let profile = self
            .profiles
            .create(CreateProfile {
                principal_id: principal.id,
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                email: principal.email.clone(),
                phone: input.phone.clone(),
                role,
                workshop_id: input.workshop_id,
                active: true,
            })
            .await
            .map_err(|e| ProvisioningError::ProfileWrite(e.to_string()))?;

        if !role.is_customer() {
            return Ok((profile, None));
        }

        let client = self
            .clients
            .create(client_from_profile(&profile))
            .await
            .map_err(|e| ProvisioningError::ClientWrite(e.to_string()))?;

        Ok((profile, Some(client)))
    }

    async fn backfill_profile(
        &self,
        principal: &Principal,
    ) -> Result<(Profile, bool), ProvisioningError> {
        match self.profiles.create(profile_from_principal(principal)).await {
            Ok(profile) => Ok((profile, true)),
            // Lost a race with another writer: keep theirs.
            Err(AutoFlowError::AlreadyExists { .. }) => self
                .find_profile(principal.id)
                .await?
                .map(|p| (p, false))
                .ok_or_else(|| ProvisioningError::ProfileWrite("profile vanished".into())),
            Err(e) => Err(ProvisioningError::ProfileWrite(e.to_string())),
        }
    }

    async fn backfill_client(&self, profile: &Profile) -> Result<(Client, bool), ProvisioningError> {
        match self.clients.create(client_from_profile(profile)).await {
            Ok(client) => Ok((client, true)),
            Err(AutoFlowError::AlreadyExists { .. }) => self
                .find_client(profile.principal_id)
                .await?
                .map(|c| (c, false))
                .ok_or_else(|| ProvisioningError::ClientWrite("client vanished".into())),
            Err(e) => Err(ProvisioningError::ClientWrite(e.to_string())),
        }
    }

    async fn find_profile(&self, principal_id: Uuid) -> Result<Option<Profile>, ProvisioningError> {
        match self.profiles.get_by_principal_id(principal_id).await {
            Ok(p) => Ok(Some(p)),
            Err(AutoFlowError::NotFound { .. }) => Ok(None),
            Err(e) => Err(lookup_error(AccountTable::Profile, e)),
        }
    }

    async fn find_client(&self, principal_id: Uuid) -> Result<Option<Client>, ProvisioningError> {
        match self.clients.get_by_principal_id(principal_id).await {
            Ok(c) => Ok(Some(c)),
            Err(AutoFlowError::NotFound { .. }) => Ok(None),
            Err(e) => Err(lookup_error(AccountTable::Client, e)),
        }
    }

    async fn end_session(&self, session_id: Uuid, principal_id: Uuid) {
        if let Err(e) = self.identity.sign_out(session_id).await {
            warn!(%principal_id, %session_id, error = %e, "Failed to sign out provisioning session");
        }
    }

    async fn compensate_principal(&self, principal_id: Uuid) {
        match self.identity.delete_principal(principal_id).await {
            Ok(()) => info!(%principal_id, "Deleted principal after profile write failure"),
            Err(e) => error!(
                %principal_id,
                error = %e,
                "Compensation failed: principal left without profile"
            ),
        }
    }
}

fn lookup_error(table: AccountTable, err: AutoFlowError) -> ProvisioningError {
    ProvisioningError::Lookup {
        table,
        message: err.to_string(),
    }
}

/// Profile defaults for a principal that has none.
///
/// Names come from the sign-up metadata; when both are blank the local
/// part of the email becomes the first name. An absent or unknown role
/// falls back to the customer role.
fn profile_from_principal(principal: &Principal) -> CreateProfile {
    let meta = principal.sign_up_metadata();

    let first_name = meta.first_name.unwrap_or_default().trim().to_string();
    let last_name = meta.last_name.unwrap_or_default().trim().to_string();
    let (first_name, last_name) = if first_name.is_empty() && last_name.is_empty() {
        let local = principal.email.split('@').next().unwrap_or_default();
        (local.to_string(), String::new())
    } else {
        (first_name, last_name)
    };

    let role = meta
        .role
        .as_deref()
        .and_then(|r| r.parse::<Role>().ok())
        .unwrap_or_default();

    CreateProfile {
        principal_id: principal.id,
        first_name,
        last_name,
        email: principal.email.clone(),
        phone: meta.phone,
        role,
        workshop_id: meta.workshop_id,
        active: true,
    }
}

fn client_from_profile(profile: &Profile) -> CreateClient {
    CreateClient {
        principal_id: profile.principal_id,
        display_name: client::display_name(&profile.first_name, &profile.last_name, &profile.email),
        email: profile.email.clone(),
        phone: profile.phone.clone(),
        company: String::new(),
        client_type: ClientType::Individual,
        workshop_id: profile.workshop_id,
        active: true,
    }
}
