//! AutoFlowX Database: SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - The identity store ([`repository::SurrealIdentityStore`]) and the
//!   profile/client repositories
//! - Error types ([`DbError`])

mod connection;
pub mod credentials;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use credentials::verify_password;
pub use error::DbError;
pub use schema::run_migrations;
