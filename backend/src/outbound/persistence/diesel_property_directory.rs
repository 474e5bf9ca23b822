//! PostgreSQL-backed `PropertyDirectory` reading the `properties` mirror.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{PropertyDirectory, PropertyDirectoryError};
use crate::domain::{Email, PropertyId, PropertySummary, PropertyVerification};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::PropertyRow;
use super::pool::DbPool;
use super::schema::properties;

#[derive(Clone)]
pub struct DieselPropertyDirectory {
    pool: DbPool,
}

impl DieselPropertyDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_summary(row: PropertyRow) -> Result<PropertySummary, PropertyDirectoryError> {
    let verification = row
        .verification
        .parse::<PropertyVerification>()
        .map_err(|_| {
            warn!(property_id = %row.id, "stored property verification is invalid");
            PropertyDirectoryError::query("stored property row is invalid")
        })?;
    // A malformed owner address only loses ownership rights; the listing
    // itself stays visible.
    let owner_email = row.owner_email.as_deref().and_then(|raw| {
        Email::new(raw)
            .inspect_err(|_| warn!(property_id = %row.id, "ignoring invalid owner email"))
            .ok()
    });
    Ok(PropertySummary {
        id: PropertyId::from_uuid(row.id),
        verification,
        owner_email,
    })
}

#[async_trait]
impl PropertyDirectory for DieselPropertyDirectory {
    async fn find(&self, id: &PropertyId) -> Result<Option<PropertySummary>, PropertyDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PropertyDirectoryError::connection))?;
        properties::table
            .find(id.as_uuid())
            .select(PropertyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                map_diesel_error(
                    err,
                    PropertyDirectoryError::query,
                    PropertyDirectoryError::connection,
                )
            })?
            .map(row_to_summary)
            .transpose()
    }
}
