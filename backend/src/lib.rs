//! Realscape marketplace backend.
//!
//! Layout follows a ports-and-adapters split:
//! - [`domain`]: entities, invariants and services.
//! - [`inbound`]: the HTTP adapter and its access gate.
//! - [`outbound`]: PostgreSQL, in-memory and JWT adapters.
//! - [`middleware`]: request tracing.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
