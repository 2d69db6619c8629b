//! Domain models for AutoFlowX.
//!
//! Identity records (principals, sessions) live in the identity store;
//! profiles and clients are business tables keyed on the same
//! principal id.

pub mod client;
pub mod principal;
pub mod profile;
pub mod session;
