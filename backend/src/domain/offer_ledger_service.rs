//! Offer ledger domain service.
//!
//! Implements the [`OfferLedger`] driving port. The exclusivity invariant
//! (one accepted offer per property) is delegated to
//! [`OfferRepository::accept_exclusive`], which adapters implement as a
//! single atomic step; this service handles lookups, authorisation, and the
//! explicit-reject rules.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    OfferLedger, OfferPersistenceError, OfferRepository, PropertyDirectory,
    PropertyDirectoryError,
};
use crate::domain::{
    Actor, Error, NewOffer, NewOfferRequest, Offer, OfferFilter, OfferId, Role,
};

const MAX_STATUS_ATTEMPTS: usize = 3;

pub(crate) const OFFER_NOT_FOUND: &str = "Offer not found";
pub(crate) const PROPERTY_NOT_FOUND: &str = "Property not found";

/// Offer ledger service implementing the driving port.
#[derive(Clone)]
pub struct OfferLedgerService<O: ?Sized, P: ?Sized> {
    offers: Arc<O>,
    properties: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<O: ?Sized, P: ?Sized> OfferLedgerService<O, P> {
    pub fn new(offers: Arc<O>, properties: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            offers,
            properties,
            clock,
        }
    }
}

fn map_offer_error(error: OfferPersistenceError) -> Error {
    if error.is_unavailable() {
        warn!(%error, "offer repository unavailable");
        return Error::service_unavailable("offer store is temporarily unavailable");
    }
    match error {
        OfferPersistenceError::UnknownProperty { .. } => Error::not_found(PROPERTY_NOT_FOUND),
        other => Error::internal(other.to_string()),
    }
}

fn map_directory_error(error: PropertyDirectoryError) -> Error {
    if error.is_unavailable() {
        warn!(%error, "property directory unavailable");
        return Error::service_unavailable("property directory is temporarily unavailable");
    }
    Error::internal(error.to_string())
}

fn offer_not_found() -> Error {
    Error::not_found(OFFER_NOT_FOUND)
}

impl<O, P> OfferLedgerService<O, P>
where
    O: OfferRepository + ?Sized,
    P: PropertyDirectory + ?Sized,
{
    /// Admins may decide any offer; owners may decide offers on their
    /// listings. Fraud-flagged callers may decide nothing.
    async fn authorize_decision(&self, actor: &Actor, offer: &Offer) -> Result<(), Error> {
        if actor.has_role(Role::Admin) {
            return Ok(());
        }
        if !actor.is_fraud() {
            let property = self
                .properties
                .find(&offer.property_id)
                .await
                .map_err(map_directory_error)?;
            if property.is_some_and(|p| p.is_owned_by(actor.email())) {
                return Ok(());
            }
        }
        Err(Error::forbidden(
            "only an admin or the property owner may decide this offer",
        ))
    }
}

#[async_trait]
impl<O, P> OfferLedger for OfferLedgerService<O, P>
where
    O: OfferRepository + ?Sized,
    P: PropertyDirectory + ?Sized,
{
    async fn submit(&self, request: &NewOfferRequest) -> Result<Offer, Error> {
        let property = self
            .properties
            .find(&request.property_id)
            .await
            .map_err(map_directory_error)?;
        if property.is_none() {
            return Err(Error::not_found(PROPERTY_NOT_FOUND));
        }

        let offer = NewOffer {
            property_id: request.property_id,
            user_email: request.user_email.clone(),
            amount: request.amount,
            submitted_at: self.clock.utc(),
        };
        let stored = self.offers.insert(&offer).await.map_err(map_offer_error)?;
        info!(offer_id = %stored.id, property_id = %stored.property_id, "offer submitted");
        Ok(stored)
    }

    async fn get(&self, id: &OfferId) -> Result<Offer, Error> {
        self.offers
            .find_by_id(id)
            .await
            .map_err(map_offer_error)?
            .ok_or_else(offer_not_found)
    }

    async fn list(&self, filter: &OfferFilter) -> Result<Vec<Offer>, Error> {
        self.offers.list(filter).await.map_err(map_offer_error)
    }

    async fn accept(&self, actor: &Actor, id: &OfferId) -> Result<Offer, Error> {
        let offer = self.get(id).await?;
        self.authorize_decision(actor, &offer).await?;

        let accepted = self
            .offers
            .accept_exclusive(id, self.clock.utc())
            .await
            .map_err(map_offer_error)?
            .ok_or_else(offer_not_found)?;
        info!(
            offer_id = %accepted.id,
            property_id = %accepted.property_id,
            decided_by = %actor.email(),
            "offer accepted"
        );
        Ok(accepted)
    }

    async fn reject(&self, actor: &Actor, id: &OfferId) -> Result<Offer, Error> {
        for attempt in 1..=MAX_STATUS_ATTEMPTS {
            let offer = self.get(id).await?;
            self.authorize_decision(actor, &offer).await?;

            let next = offer.status.reject().map_err(|err| {
                Error::invalid_request(err.to_string())
                    .with_details(json!({ "code": "invalid_transition" }))
            })?;
            if offer.status == next {
                return Ok(offer);
            }

            let updated = self
                .offers
                .compare_and_set_status(id, offer.status, next, self.clock.utc())
                .await
                .map_err(map_offer_error)?;
            if let Some(updated) = updated {
                info!(offer_id = %updated.id, decided_by = %actor.email(), "offer rejected");
                return Ok(updated);
            }
            debug!(attempt, offer_id = %id, "offer status changed concurrently");
        }
        Err(Error::conflict("offer status changed concurrently; retry"))
    }
}

#[cfg(test)]
#[path = "offer_ledger_service_tests.rs"]
mod tests;
