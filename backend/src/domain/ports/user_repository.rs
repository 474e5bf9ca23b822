//! Driven port for user persistence.
//!
//! Writes that depend on the current state are expressed as conditional
//! updates so adapters can apply them atomically; callers re-read and decide
//! again when a condition no longer holds.

use async_trait::async_trait;

use crate::domain::{Email, Role, User, UserId, UserRegistration, UserStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
    unavailable: [Connection];
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the user unless the email is already registered, returning the
    /// stored record either way.
    async fn insert_if_absent(
        &self,
        registration: &UserRegistration,
    ) -> Result<User, UserPersistenceError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// All users ordered by creation time.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Set `next` only while the stored status still equals `expected`.
    ///
    /// Returns the updated user, or `None` when the user is missing or the
    /// condition failed.
    async fn compare_and_set_status(
        &self,
        id: &UserId,
        expected: UserStatus,
        next: UserStatus,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Unconditional status write; `None` when the user is missing.
    async fn set_status(
        &self,
        id: &UserId,
        status: UserStatus,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Overwrite the role; `None` when the user is missing.
    async fn set_role(&self, id: &UserId, role: Role) -> Result<Option<User>, UserPersistenceError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
