//! HTTP inbound adapter exposing the marketplace REST endpoints.
//!
//! Handlers depend on the driving ports bundled in [`state::HttpState`];
//! authentication and role checks happen in [`access_gate`] before a
//! handler runs.

pub mod access_gate;
pub mod auth;
pub mod error;
pub mod health;
pub mod offers;
pub mod routes;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
