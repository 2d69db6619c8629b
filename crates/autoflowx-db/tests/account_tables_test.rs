//! Integration tests for the profile and client repositories.

use autoflowx_core::error::AutoFlowError;
use autoflowx_core::models::client::{ClientType, CreateClient};
use autoflowx_core::models::profile::{CreateProfile, Role};
use autoflowx_core::repository::{ClientRepository, ProfileRepository};
use autoflowx_db::repository::{SurrealClientRepository, SurrealProfileRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    autoflowx_db::run_migrations(&db).await.unwrap();
    db
}

fn profile_input(principal_id: Uuid, email: &str, role: Role) -> CreateProfile {
    CreateProfile {
        principal_id,
        first_name: "Ana".into(),
        last_name: "Lopez".into(),
        email: email.into(),
        phone: Some("+52 555 0101".into()),
        role,
        workshop_id: None,
        active: true,
    }
}

fn client_input(principal_id: Uuid, email: &str) -> CreateClient {
    CreateClient {
        principal_id,
        display_name: "Ana Lopez".into(),
        email: email.into(),
        phone: None,
        company: String::new(),
        client_type: ClientType::Individual,
        workshop_id: None,
        active: true,
    }
}

#[tokio::test]
async fn create_and_get_profile() {
    let repo = SurrealProfileRepository::new(setup().await);
    let principal_id = Uuid::new_v4();

    let profile = repo
        .create(profile_input(principal_id, "Ana@X.com", Role::Client))
        .await
        .unwrap();

    assert_eq!(profile.principal_id, principal_id);
    assert_eq!(profile.email, "ana@x.com");
    assert_eq!(profile.role, Role::Client);
    assert!(profile.active);
    assert_eq!(profile.phone.as_deref(), Some("+52 555 0101"));

    let by_id = repo.get_by_principal_id(principal_id).await.unwrap();
    assert_eq!(by_id.first_name, "Ana");

    let by_email = repo.get_by_email("ana@x.com").await.unwrap();
    assert_eq!(by_email.principal_id, principal_id);
}

#[tokio::test]
async fn second_profile_for_principal_is_rejected() {
    let repo = SurrealProfileRepository::new(setup().await);
    let principal_id = Uuid::new_v4();

    repo.create(profile_input(principal_id, "ana@x.com", Role::Client))
        .await
        .unwrap();
    let err = repo
        .create(profile_input(principal_id, "ana@x.com", Role::Admin))
        .await
        .unwrap_err();

    assert!(
        matches!(err, AutoFlowError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
    // The original row is untouched.
    let stored = repo.get_by_principal_id(principal_id).await.unwrap();
    assert_eq!(stored.role, Role::Client);
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let repo = SurrealProfileRepository::new(setup().await);
    assert!(
        repo.get_by_principal_id(Uuid::new_v4())
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(repo.get_by_email("x@y.z").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn list_profiles_by_workshop() {
    let repo = SurrealProfileRepository::new(setup().await);
    let workshop = Uuid::new_v4();

    for (i, role) in [Role::Technician, Role::Advisor].into_iter().enumerate() {
        let mut input = profile_input(Uuid::new_v4(), &format!("staff{i}@x.com"), role);
        input.workshop_id = Some(workshop);
        repo.create(input).await.unwrap();
    }
    repo.create(profile_input(Uuid::new_v4(), "other@x.com", Role::Client))
        .await
        .unwrap();

    let staff = repo.list_by_workshop(workshop).await.unwrap();
    assert_eq!(staff.len(), 2);
    assert!(staff.iter().all(|p| p.workshop_id == Some(workshop)));
}

#[tokio::test]
async fn create_and_get_client() {
    let repo = SurrealClientRepository::new(setup().await);
    let principal_id = Uuid::new_v4();
    let workshop = Uuid::new_v4();

    let mut input = client_input(principal_id, "ana@x.com");
    input.workshop_id = Some(workshop);
    let client = repo.create(input).await.unwrap();

    assert_eq!(client.principal_id, principal_id);
    assert_eq!(client.display_name, "Ana Lopez");
    assert_eq!(client.client_type, ClientType::Individual);
    assert_eq!(client.company, "");
    assert_eq!(client.workshop_id, Some(workshop));

    let by_email = repo.get_by_email("ANA@x.com").await.unwrap();
    assert_eq!(by_email.principal_id, principal_id);
}

#[tokio::test]
async fn second_client_for_principal_is_rejected() {
    let repo = SurrealClientRepository::new(setup().await);
    let principal_id = Uuid::new_v4();

    repo.create(client_input(principal_id, "ana@x.com"))
        .await
        .unwrap();
    let err = repo
        .create(client_input(principal_id, "ana@x.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, AutoFlowError::AlreadyExists { .. }));
}
