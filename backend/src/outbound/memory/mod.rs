//! In-process adapters for running without PostgreSQL.
//!
//! Each store keeps its state behind one mutex and never awaits while holding
//! it, so every port operation is a single critical section. That is what
//! makes `accept_exclusive` atomic here.

mod offers;
mod properties;
mod users;

pub use offers::InMemoryOfferRepository;
pub use properties::InMemoryPropertyDirectory;
pub use users::InMemoryUserRepository;
