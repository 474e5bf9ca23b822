//! In-memory `PropertyDirectory`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{PropertyDirectory, PropertyDirectoryError};
use crate::domain::{PropertyId, PropertySummary};

/// Directory backed by a map; properties are registered up front.
#[derive(Debug, Default)]
pub struct InMemoryPropertyDirectory {
    properties: RwLock<HashMap<PropertyId, PropertySummary>>,
}

impl InMemoryPropertyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a property.
    pub fn insert(&self, summary: PropertySummary) -> Result<(), PropertyDirectoryError> {
        self.properties
            .write()
            .map_err(|_| PropertyDirectoryError::query("property directory lock poisoned"))?
            .insert(summary.id, summary);
        Ok(())
    }

    pub fn with_property(self, summary: PropertySummary) -> Result<Self, PropertyDirectoryError> {
        self.insert(summary)?;
        Ok(self)
    }
}

#[async_trait]
impl PropertyDirectory for InMemoryPropertyDirectory {
    async fn find(&self, id: &PropertyId) -> Result<Option<PropertySummary>, PropertyDirectoryError> {
        Ok(self
            .properties
            .read()
            .map_err(|_| PropertyDirectoryError::query("property directory lock poisoned"))?
            .get(id)
            .cloned())
    }
}
