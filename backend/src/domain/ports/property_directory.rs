//! Read-only lookup of listed properties.

use async_trait::async_trait;

use crate::domain::{PropertyId, PropertySummary, PropertyVerification};

use super::define_port_error;

define_port_error! {
    /// Errors raised by property directory adapters.
    pub enum PropertyDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } => "property directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } => "property directory query failed: {message}",
    }
    unavailable: [Connection];
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyDirectory: Send + Sync {
    async fn find(&self, id: &PropertyId) -> Result<Option<PropertySummary>, PropertyDirectoryError>;
}

/// Directory that knows every property id and assigns no owners.
///
/// Used when listings live in a separate service that this deployment cannot
/// reach; only admins can then decide offers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePropertyDirectory;

#[async_trait]
impl PropertyDirectory for FixturePropertyDirectory {
    async fn find(&self, id: &PropertyId) -> Result<Option<PropertySummary>, PropertyDirectoryError> {
        Ok(Some(PropertySummary {
            id: *id,
            verification: PropertyVerification::Verified,
            owner_email: None,
        }))
    }
}
