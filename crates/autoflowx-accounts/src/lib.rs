//! AutoFlowX Accounts: provisioning of principal, profile and client
//! records, plus the read-side integrity check and idempotent repair.

pub mod config;
pub mod error;
pub mod report;
pub mod service;

pub use config::{ExistenceCheck, ProvisioningConfig};
pub use error::{ErrorKind, ProvisioningError};
pub use report::{AccountTable, AccountValidation, ProvisionedAccount, RepairReport};
pub use service::{AccountService, CreateAccount};
