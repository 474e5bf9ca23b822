//! PostgreSQL-backed `OfferRepository` implementation using Diesel ORM.
//!
//! Acceptance runs in one transaction that first locks the parent
//! `properties` row, so concurrent accepts for the same property serialise.
//! Sibling offers are superseded before the target is marked accepted, which
//! keeps the `offers_one_accepted_per_property` index satisfied at every
//! statement boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::{debug, warn};

use crate::domain::ports::{OfferPersistenceError, OfferRepository};
use crate::domain::{
    Email, NewOffer, Offer, OfferAmount, OfferFilter, OfferId, OfferStatus, PropertyId,
};

use super::diesel_error_mapping::{is_foreign_key_violation, map_diesel_error, map_pool_error};
use super::models::{NewOfferRow, OfferRow};
use super::pool::{DbPool, PoolError};
use super::schema::{offers, properties};

/// Diesel-backed implementation of the `OfferRepository` port.
#[derive(Clone)]
pub struct DieselOfferRepository {
    pool: DbPool,
}

impl DieselOfferRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> OfferPersistenceError {
    map_pool_error(error, OfferPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> OfferPersistenceError {
    map_diesel_error(
        error,
        OfferPersistenceError::query,
        OfferPersistenceError::connection,
    )
}

fn row_to_offer(row: OfferRow) -> Result<Offer, OfferPersistenceError> {
    let corrupt = |field: &str| {
        warn!(offer_id = %row.id, field, "stored offer row failed validation");
        OfferPersistenceError::query("stored offer row is invalid")
    };
    Ok(Offer {
        id: OfferId::from_uuid(row.id),
        property_id: PropertyId::from_uuid(row.property_id),
        user_email: Email::new(&row.user_email).map_err(|_| corrupt("user_email"))?,
        amount: OfferAmount::new(row.amount).map_err(|_| corrupt("amount"))?,
        status: row
            .bought_status
            .parse::<OfferStatus>()
            .map_err(|_| corrupt("bought_status"))?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Outcome of the acceptance transaction before row conversion.
enum AcceptOutcome {
    Missing,
    Accepted(OfferRow),
}

#[async_trait]
impl OfferRepository for DieselOfferRepository {
    async fn insert(&self, offer: &NewOffer) -> Result<Offer, OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let new_row = NewOfferRow {
            property_id: *offer.property_id.as_uuid(),
            user_email: offer.user_email.as_ref(),
            amount: offer.amount.get(),
            bought_status: OfferStatus::Pending.as_str(),
            created_at: offer.submitted_at,
            updated_at: offer.submitted_at,
        };

        let row: OfferRow = diesel::insert_into(offers::table)
            .values(&new_row)
            .returning(OfferRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    OfferPersistenceError::unknown_property(offer.property_id.to_string())
                } else {
                    diesel_error(err)
                }
            })?;
        row_to_offer(row)
    }

    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        offers::table
            .find(id.as_uuid())
            .select(OfferRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_offer)
            .transpose()
    }

    async fn list(&self, filter: &OfferFilter) -> Result<Vec<Offer>, OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = offers::table
            .select(OfferRow::as_select())
            .order((offers::created_at.asc(), offers::id.asc()))
            .into_boxed();
        if let Some(property_id) = &filter.property_id {
            query = query.filter(offers::property_id.eq(*property_id.as_uuid()));
        }
        if let Some(email) = &filter.user_email {
            query = query.filter(offers::user_email.eq(email.as_ref().to_owned()));
        }
        let rows: Vec<OfferRow> = query.load(&mut conn).await.map_err(diesel_error)?;
        rows.into_iter().map(row_to_offer).collect()
    }

    async fn accept_exclusive(
        &self,
        id: &OfferId,
        at: DateTime<Utc>,
    ) -> Result<Option<Offer>, OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let offer_id = *id.as_uuid();

        let outcome = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let target: Option<OfferRow> = offers::table
                        .find(offer_id)
                        .select(OfferRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(target) = target else {
                        return Ok(AcceptOutcome::Missing);
                    };

                    properties::table
                        .find(target.property_id)
                        .select(properties::id)
                        .for_update()
                        .first::<uuid::Uuid>(conn)
                        .await?;

                    let superseded = diesel::update(
                        offers::table
                            .filter(offers::property_id.eq(target.property_id))
                            .filter(offers::id.ne(offer_id))
                            .filter(offers::bought_status.ne(OfferStatus::Rejected.as_str())),
                    )
                    .set((
                        offers::bought_status.eq(OfferStatus::Rejected.as_str()),
                        offers::updated_at.eq(at),
                    ))
                    .execute(conn)
                    .await?;
                    debug!(%offer_id, superseded, "superseded sibling offers");

                    let accepted: OfferRow = diesel::update(offers::table.find(offer_id))
                        .set((
                            offers::bought_status.eq(OfferStatus::Accepted.as_str()),
                            offers::updated_at.eq(at),
                        ))
                        .returning(OfferRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(AcceptOutcome::Accepted(accepted))
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        match outcome {
            AcceptOutcome::Missing => Ok(None),
            AcceptOutcome::Accepted(row) => row_to_offer(row).map(Some),
        }
    }

    async fn compare_and_set_status(
        &self,
        id: &OfferId,
        expected: OfferStatus,
        next: OfferStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Offer>, OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(
            offers::table
                .filter(offers::id.eq(id.as_uuid()))
                .filter(offers::bought_status.eq(expected.as_str())),
        )
        .set((
            offers::bought_status.eq(next.as_str()),
            offers::updated_at.eq(at),
        ))
        .returning(OfferRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?
        .map(row_to_offer)
        .transpose()
    }
}
