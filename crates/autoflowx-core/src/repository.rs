//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The provisioning service is
//! generic over these traits so it never depends on a storage backend.

use uuid::Uuid;

use crate::error::AutoFlowResult;
use crate::models::{
    client::{Client, CreateClient},
    principal::{CreatePrincipal, Principal},
    profile::{CreateProfile, Profile},
    session::{Session, SignIn, SignUp},
};

// ---------------------------------------------------------------------------
// Identity store
// ---------------------------------------------------------------------------

/// Credentialed principals and their sessions.
///
/// Error contract:
/// - `sign_up` with a registered email → `AlreadyExists`
/// - `sign_in_with_password` with a wrong password → `AuthenticationFailed`
/// - unknown email or id → `NotFound`
/// - malformed email → `Validation`
pub trait IdentityStore: Send + Sync {
    /// Create a principal and open a session for it.
    fn sign_up(&self, input: CreatePrincipal) -> impl Future<Output = AutoFlowResult<SignUp>> + Send;
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = AutoFlowResult<SignIn>> + Send;
    /// Terminate a session. Signing out an unknown session is a no-op.
    fn sign_out(&self, session_id: Uuid) -> impl Future<Output = AutoFlowResult<()>> + Send;
    /// Admin-level hard delete of a principal and all of its sessions.
    fn delete_principal(&self, id: Uuid) -> impl Future<Output = AutoFlowResult<()>> + Send;
    fn get_principal_by_id(&self, id: Uuid)
    -> impl Future<Output = AutoFlowResult<Principal>> + Send;
    fn get_principal_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = AutoFlowResult<Principal>> + Send;
    /// Unexpired sessions of a principal.
    fn list_sessions(
        &self,
        principal_id: Uuid,
    ) -> impl Future<Output = AutoFlowResult<Vec<Session>>> + Send;
}

// ---------------------------------------------------------------------------
// Business tables
// ---------------------------------------------------------------------------

pub trait ProfileRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the principal already has a profile.
    fn create(&self, input: CreateProfile) -> impl Future<Output = AutoFlowResult<Profile>> + Send;
    fn get_by_principal_id(
        &self,
        principal_id: Uuid,
    ) -> impl Future<Output = AutoFlowResult<Profile>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = AutoFlowResult<Profile>> + Send;
    fn list_by_workshop(
        &self,
        workshop_id: Uuid,
    ) -> impl Future<Output = AutoFlowResult<Vec<Profile>>> + Send;
}

pub trait ClientRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the principal already has a client.
    fn create(&self, input: CreateClient) -> impl Future<Output = AutoFlowResult<Client>> + Send;
    fn get_by_principal_id(
        &self,
        principal_id: Uuid,
    ) -> impl Future<Output = AutoFlowResult<Client>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = AutoFlowResult<Client>> + Send;
}
