//! Shared validation helpers for inbound HTTP adapters.
//!
//! Raw path, query and body values are parsed into domain types here so
//! handlers only see validated values. Failures become `invalid_request`
//! errors naming the offending field.

use std::fmt::Display;

use serde_json::json;

use crate::domain::{Email, Error, OfferAmount, OfferId, PropertyId, Role, UserId};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const EMAIL: FieldName = FieldName::new("email");
pub(crate) const USER_EMAIL: FieldName = FieldName::new("userEmail");
pub(crate) const USER_ID: FieldName = FieldName::new("userId");
pub(crate) const OFFER_ID: FieldName = FieldName::new("offerId");
pub(crate) const PROPERTY_ID: FieldName = FieldName::new("propertyId");
pub(crate) const AMOUNT: FieldName = FieldName::new("amount");
pub(crate) const ROLE: FieldName = FieldName::new("role");
pub(crate) const PROFILE: FieldName = FieldName::new("profile");

/// Build an `invalid_request` error carrying the field name.
pub(crate) fn field_error(field: FieldName, reason: impl Display) -> Error {
    Error::invalid_request(reason.to_string()).with_details(json!({
        "field": field.as_str(),
        "code": "invalid_field",
    }))
}

pub(crate) fn parse_email(field: FieldName, raw: &str) -> Result<Email, Error> {
    Email::new(raw).map_err(|err| field_error(field, err))
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| field_error(USER_ID, err))
}

pub(crate) fn parse_offer_id(raw: &str) -> Result<OfferId, Error> {
    OfferId::new(raw).map_err(|err| field_error(OFFER_ID, err))
}

pub(crate) fn parse_property_id(raw: &str) -> Result<PropertyId, Error> {
    PropertyId::new(raw).map_err(|err| field_error(PROPERTY_ID, err))
}

pub(crate) fn parse_amount(raw: i64) -> Result<OfferAmount, Error> {
    OfferAmount::new(raw).map_err(|err| field_error(AMOUNT, err))
}

pub(crate) fn parse_role(raw: &str) -> Result<Role, Error> {
    raw.parse::<Role>().map_err(|err| field_error(ROLE, err))
}
