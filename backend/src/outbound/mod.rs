//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: process-local repositories for development and tests
//! - **credentials**: HS256 JSON Web Token codec
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod credentials;
pub mod memory;
pub mod persistence;
