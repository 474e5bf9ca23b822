//! Driving port for the offer lifecycle.

use async_trait::async_trait;

use crate::domain::{Actor, Error, NewOfferRequest, Offer, OfferFilter, OfferId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferLedger: Send + Sync {
    async fn submit(&self, request: &NewOfferRequest) -> Result<Offer, Error>;

    async fn get(&self, id: &OfferId) -> Result<Offer, Error>;

    async fn list(&self, filter: &OfferFilter) -> Result<Vec<Offer>, Error>;

    /// Accept the offer and reject its siblings. `actor` must be an admin or
    /// the property owner.
    async fn accept(&self, actor: &Actor, id: &OfferId) -> Result<Offer, Error>;

    /// Reject the offer. `actor` must be an admin or the property owner.
    async fn reject(&self, actor: &Actor, id: &OfferId) -> Result<Offer, Error>;
}
