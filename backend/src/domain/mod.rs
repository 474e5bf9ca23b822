//! Domain primitives, aggregates and services.
//!
//! Purpose: define the marketplace's strongly typed entities (users, offers,
//! property summaries, session credentials) and the services that enforce
//! their invariants. Nothing here knows about HTTP or SQL; adapters reach the
//! domain through the traits in [`ports`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `User`, `Email`, `Role`, `UserStatus`: the registry's data model.
//! - `Offer`, `OfferStatus`: the ledger's data model and status machine.
//! - `CredentialIssuer`: issues and verifies session credentials.
//! - `RoutePolicy`, `Actor`: access requirements per operation.
//! - `UserRegistryService`, `OfferLedgerService`: driving port implementations.

pub mod access;
pub mod credentials;
pub mod error;
pub mod offer;
pub mod offer_ledger_service;
pub mod ports;
pub mod property;
pub mod trace_id;
pub mod user;
pub mod user_registry_service;

pub use self::access::{AccessRequirement, Actor, Operation, PolicyParseError, RoutePolicy};
pub use self::credentials::{
    CredentialError, CredentialIssuer, Identity, IssuedCredential, SESSION_VALIDITY_DAYS,
    SessionClaims,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::offer::{
    NewOffer, NewOfferRequest, Offer, OfferAmount, OfferFilter, OfferId, OfferPayload,
    OfferStatus, OfferTransitionError, OfferValidationError,
};
pub use self::offer_ledger_service::OfferLedgerService;
pub use self::property::{
    PropertyId, PropertySummary, PropertyValidationError, PropertyVerification,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, Role, User, UserId, UserPayload, UserProfile, UserRegistration, UserStatus,
    UserTransitionError, UserValidationError,
};
pub use self::user_registry_service::UserRegistryService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use realscape::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
