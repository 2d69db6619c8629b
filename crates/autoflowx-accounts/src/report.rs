//! Result types of the account operations.

use std::collections::BTreeSet;

use autoflowx_core::models::client::Client;
use autoflowx_core::models::principal::Principal;
use autoflowx_core::models::profile::Profile;
use serde::Serialize;
use uuid::Uuid;

/// The stores an account spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountTable {
    Identity,
    Profile,
    Client,
}

impl std::fmt::Display for AccountTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            Self::Profile => write!(f, "profile"),
            Self::Client => write!(f, "client"),
        }
    }
}

/// Successful `create_account` result.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedAccount {
    pub principal_id: Uuid,
    pub profile: Profile,
    /// Present iff the profile role is the customer role.
    pub client: Option<Client>,
}

/// Read-only integrity verdict for one email.
#[derive(Debug, Clone, Serialize)]
pub struct AccountValidation {
    pub is_valid: bool,
    /// Tables whose row is missing. When the principal itself is
    /// missing this is exactly `{identity}`.
    pub missing: BTreeSet<AccountTable>,
    #[serde(skip)]
    pub principal: Option<Principal>,
    pub profile: Option<Profile>,
    pub client: Option<Client>,
}

impl AccountValidation {
    pub(crate) fn without_identity() -> Self {
        Self {
            is_valid: false,
            missing: BTreeSet::from([AccountTable::Identity]),
            principal: None,
            profile: None,
            client: None,
        }
    }

    pub(crate) fn new(
        principal: Principal,
        profile: Option<Profile>,
        client: Option<Client>,
        missing: BTreeSet<AccountTable>,
    ) -> Self {
        Self {
            is_valid: missing.is_empty(),
            missing,
            principal: Some(principal),
            profile,
            client,
        }
    }

    /// Whether a principal exists, i.e. whether repair can act at all.
    pub fn has_identity(&self) -> bool {
        self.principal.is_some()
    }

    pub fn principal_id(&self) -> Option<Uuid> {
        self.principal.as_ref().map(|p| p.id)
    }
}

/// Outcome of `repair_account`.
#[derive(Debug, Clone, Serialize)]
pub struct RepairReport {
    pub principal_id: Uuid,
    /// Tables a row was inserted into. Empty when the account was
    /// already valid.
    pub backfilled: BTreeSet<AccountTable>,
    pub profile: Profile,
    pub client: Option<Client>,
}

impl RepairReport {
    pub fn is_noop(&self) -> bool {
        self.backfilled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_identity_is_reported_alone() {
        let v = AccountValidation::without_identity();
        assert!(!v.is_valid);
        assert!(!v.has_identity());
        assert_eq!(v.missing.len(), 1);
        assert!(v.missing.contains(&AccountTable::Identity));
    }

    #[test]
    fn tables_serialize_in_lowercase() {
        let set = BTreeSet::from([AccountTable::Client, AccountTable::Profile]);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            serde_json::json!(["profile", "client"])
        );
    }
}
