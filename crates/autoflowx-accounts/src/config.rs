//! Provisioning configuration.

/// How `create_account` decides whether an email is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistenceCheck {
    /// Sign in with a deliberately wrong password: an "invalid
    /// credentials" failure means the account exists. Best-effort, for
    /// callers without admin access to the identity store.
    #[default]
    Probe,
    /// Look the principal up by email. Requires privileged access.
    Lookup,
}

/// Configuration for the account service.
#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
    /// Initial password given to every provisioned principal.
    pub default_credential: String,
    /// Password used by the existence probe. Must never be a real
    /// password.
    pub probe_credential: String,
    pub existence_check: ExistenceCheck,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            default_credential: "123456".into(),
            probe_credential: "__autoflowx-existence-probe__".into(),
            existence_check: ExistenceCheck::Probe,
        }
    }
}
