//! In-memory `OfferRepository`.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{OfferPersistenceError, OfferRepository};
use crate::domain::{NewOffer, Offer, OfferFilter, OfferId, OfferStatus};

#[derive(Debug, Default)]
pub struct InMemoryOfferRepository {
    offers: Mutex<Vec<Offer>>,
}

impl InMemoryOfferRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Offer>>, OfferPersistenceError> {
        self.offers
            .lock()
            .map_err(|_| OfferPersistenceError::query("offer store lock poisoned"))
    }
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn insert(&self, offer: &NewOffer) -> Result<Offer, OfferPersistenceError> {
        let stored = Offer {
            id: OfferId::random(),
            property_id: offer.property_id,
            user_email: offer.user_email.clone(),
            amount: offer.amount,
            status: OfferStatus::Pending,
            created_at: offer.submitted_at,
            updated_at: offer.submitted_at,
        };
        self.lock()?.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, OfferPersistenceError> {
        Ok(self.lock()?.iter().find(|offer| offer.id == *id).cloned())
    }

    async fn list(&self, filter: &OfferFilter) -> Result<Vec<Offer>, OfferPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|offer| filter.matches(offer))
            .cloned()
            .collect())
    }

    async fn accept_exclusive(
        &self,
        id: &OfferId,
        at: DateTime<Utc>,
    ) -> Result<Option<Offer>, OfferPersistenceError> {
        let mut offers = self.lock()?;
        let Some(property_id) = offers
            .iter()
            .find(|offer| offer.id == *id)
            .map(|offer| offer.property_id)
        else {
            return Ok(None);
        };

        let mut accepted = None;
        for offer in offers
            .iter_mut()
            .filter(|offer| offer.property_id == property_id)
        {
            if offer.id == *id {
                offer.status = OfferStatus::Accepted;
                offer.updated_at = at;
                accepted = Some(offer.clone());
            } else if offer.status != OfferStatus::Rejected {
                offer.status = offer.status.supersede();
                offer.updated_at = at;
            }
        }
        Ok(accepted)
    }

    async fn compare_and_set_status(
        &self,
        id: &OfferId,
        expected: OfferStatus,
        next: OfferStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Offer>, OfferPersistenceError> {
        let mut offers = self.lock()?;
        let Some(offer) = offers
            .iter_mut()
            .find(|offer| offer.id == *id && offer.status == expected)
        else {
            return Ok(None);
        };
        offer.status = next;
        offer.updated_at = at;
        Ok(Some(offer.clone()))
    }
}
