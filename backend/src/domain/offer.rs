//! Purchase offers and their status machine.
//!
//! ```text
//! pending ──accept──▶ accepted
//!    │                  │ (sibling accepted)
//!    └──reject──▶ rejected ◀┘
//!                   │
//!                   └──accept──▶ accepted   (last accept wins)
//! ```
//!
//! An accepted offer only leaves `accepted` when a sibling on the same
//! property is accepted; a direct reject is refused.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Email, PropertyId};

/// Errors raised while building offer values from raw input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OfferValidationError {
    #[error("offer id must be a valid UUID")]
    InvalidId,
    #[error("offer amount must be a positive whole number, got {0}")]
    NonPositiveAmount(i64),
    #[error("unknown offer status `{0}`")]
    UnknownStatus(String),
}

/// Stable offer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(Uuid);

impl OfferId {
    pub fn new(id: impl AsRef<str>) -> Result<Self, OfferValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(OfferValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| OfferValidationError::InvalidId)
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Offered price in whole currency units; always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct OfferAmount(i64);

impl OfferAmount {
    pub fn new(amount: i64) -> Result<Self, OfferValidationError> {
        if amount <= 0 {
            return Err(OfferValidationError::NonPositiveAmount(amount));
        }
        Ok(Self(amount))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for OfferAmount {
    type Error = OfferValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OfferAmount> for i64 {
    fn from(value: OfferAmount) -> Self {
        value.0
    }
}

/// Lifecycle state of an offer, serialised as `boughtStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Why an offer transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OfferTransitionError {
    #[error("offer has already been accepted")]
    AlreadyAccepted,
}

impl OfferStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Explicit reject. Idempotent on rejected offers.
    pub fn reject(self) -> Result<Self, OfferTransitionError> {
        match self {
            Self::Pending | Self::Rejected => Ok(Self::Rejected),
            Self::Accepted => Err(OfferTransitionError::AlreadyAccepted),
        }
    }

    /// Status of a sibling once another offer on the property is accepted.
    pub fn supersede(self) -> Self {
        Self::Rejected
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = OfferValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(OfferValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// A purchase offer on a property.
///
/// ## Invariants
/// - At most one offer per `property_id` is [`OfferStatus::Accepted`] at any
///   observable time. Persistence adapters uphold this in
///   `OfferRepository::accept_exclusive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OfferPayload", into = "OfferPayload")]
pub struct Offer {
    pub id: OfferId,
    pub property_id: PropertyId,
    pub user_email: Email,
    pub amount: OfferAmount,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A buyer's offer as submitted, before the ledger stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOfferRequest {
    pub property_id: PropertyId,
    pub user_email: Email,
    pub amount: OfferAmount,
}

/// A validated offer awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOffer {
    pub property_id: PropertyId,
    pub user_email: Email,
    pub amount: OfferAmount,
    pub submitted_at: DateTime<Utc>,
}

/// Listing filter; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferFilter {
    pub property_id: Option<PropertyId>,
    pub user_email: Option<Email>,
}

impl OfferFilter {
    pub fn matches(&self, offer: &Offer) -> bool {
        self.property_id.is_none_or(|id| id == offer.property_id)
            && self
                .user_email
                .as_ref()
                .is_none_or(|email| *email == offer.user_email)
    }
}

/// JSON representation of an [`Offer`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[schema(as = Offer)]
pub struct OfferPayload {
    pub id: Uuid,
    pub property_id: Uuid,
    #[schema(example = "buyer@example.com")]
    pub user_email: String,
    #[schema(example = 250000)]
    pub amount: i64,
    pub bought_status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Offer> for OfferPayload {
    fn from(value: Offer) -> Self {
        Self {
            id: *value.id.as_uuid(),
            property_id: *value.property_id.as_uuid(),
            user_email: value.user_email.into(),
            amount: value.amount.get(),
            bought_status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl TryFrom<OfferPayload> for Offer {
    type Error = String;

    fn try_from(value: OfferPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OfferId::from_uuid(value.id),
            property_id: PropertyId::from_uuid(value.property_id),
            user_email: Email::new(value.user_email).map_err(|err| err.to_string())?,
            amount: OfferAmount::new(value.amount).map_err(|err| err.to_string())?,
            status: value.bought_status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}
