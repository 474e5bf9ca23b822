//! Driven port for offer persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewOffer, Offer, OfferFilter, OfferId, OfferStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by offer repository adapters.
    pub enum OfferPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "offer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "offer repository query failed: {message}",
        /// The offer references a property the store does not know.
        UnknownProperty { property_id: String } => "property {property_id} does not exist",
    }
    unavailable: [Connection];
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Store a new `pending` offer and return it with its assigned id.
    async fn insert(&self, offer: &NewOffer) -> Result<Offer, OfferPersistenceError>;

    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, OfferPersistenceError>;

    /// Offers matching `filter`, oldest first.
    async fn list(&self, filter: &OfferFilter) -> Result<Vec<Offer>, OfferPersistenceError>;

    /// Accept `id` and reject every other non-rejected offer on the same
    /// property as one atomic step.
    ///
    /// Concurrent calls for offers on the same property must serialise so at
    /// most one offer per property is ever observed as accepted. Returns
    /// `None` when the offer does not exist.
    async fn accept_exclusive(
        &self,
        id: &OfferId,
        at: DateTime<Utc>,
    ) -> Result<Option<Offer>, OfferPersistenceError>;

    /// Set `next` only while the stored status still equals `expected`.
    async fn compare_and_set_status(
        &self,
        id: &OfferId,
        expected: OfferStatus,
        next: OfferStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Offer>, OfferPersistenceError>;
}
