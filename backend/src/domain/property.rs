//! Read-only view of a listed property.
//!
//! Listing CRUD belongs to another service; the marketplace core only needs
//! to know that a property exists and who owns it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Email;

/// Errors raised while parsing property values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyValidationError {
    #[error("property id must be a valid UUID")]
    InvalidId,
    #[error("unknown verification state `{0}`")]
    UnknownVerification(String),
}

/// Stable property identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(Uuid);

impl PropertyId {
    pub fn new(id: impl AsRef<str>) -> Result<Self, PropertyValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(PropertyValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| PropertyValidationError::InvalidId)
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

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Moderation state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PropertyVerification {
    Pending,
    Verified,
    Rejected,
}

impl PropertyVerification {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for PropertyVerification {
    type Err = PropertyValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            other => Err(PropertyValidationError::UnknownVerification(other.to_owned())),
        }
    }
}

/// What the offer ledger knows about a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySummary {
    pub id: PropertyId,
    pub verification: PropertyVerification,
    pub owner_email: Option<Email>,
}

impl PropertySummary {
    pub fn is_owned_by(&self, email: &Email) -> bool {
        self.owner_email.as_ref() == Some(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case(" 9b2f3c4e-1a2b-4c3d-8e9f-0a1b2c3d4e5f")]
    fn property_id_rejects_bad_input(#[case] raw: &str) {
        assert_eq!(PropertyId::new(raw), Err(PropertyValidationError::InvalidId));
    }

    #[rstest]
    fn ownership_compares_normalised_email() {
        let owner = Email::new("Owner@Example.com").expect("valid email");
        let summary = PropertySummary {
            id: PropertyId::random(),
            verification: PropertyVerification::Verified,
            owner_email: Some(owner),
        };

        assert!(summary.is_owned_by(&Email::new("owner@example.com").expect("valid email")));
        assert!(!summary.is_owned_by(&Email::new("buyer@example.com").expect("valid email")));
    }

    #[rstest]
    fn unowned_property_has_no_owner() {
        let summary = PropertySummary {
            id: PropertyId::random(),
            verification: PropertyVerification::Pending,
            owner_email: None,
        };
        assert!(!summary.is_owned_by(&Email::new("any@example.com").expect("valid email")));
    }
}
