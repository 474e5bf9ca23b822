//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`UserRegistry`, `OfferLedger`) are what inbound adapters
//! call. Driven ports (`UserRepository`, `OfferRepository`,
//! `PropertyDirectory`, `CredentialCodec`) are what the domain services need
//! from infrastructure. Each driven port exposes a typed error enum built with
//! `define_port_error!` so adapters map failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_codec;
mod offer_ledger;
mod offer_repository;
mod property_directory;
mod user_registry;
mod user_repository;

#[cfg(test)]
pub use credential_codec::MockCredentialCodec;
pub use credential_codec::{CredentialCodec, CredentialCodecError};
#[cfg(test)]
pub use offer_ledger::MockOfferLedger;
pub use offer_ledger::OfferLedger;
#[cfg(test)]
pub use offer_repository::MockOfferRepository;
pub use offer_repository::{OfferPersistenceError, OfferRepository};
#[cfg(test)]
pub use property_directory::MockPropertyDirectory;
pub use property_directory::{FixturePropertyDirectory, PropertyDirectory, PropertyDirectoryError};
#[cfg(test)]
pub use user_registry::MockUserRegistry;
pub use user_registry::UserRegistry;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
