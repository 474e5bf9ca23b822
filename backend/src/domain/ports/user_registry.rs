//! Driving port for user registration and moderation.
//!
//! Inbound adapters call this port; handler tests substitute the automock
//! instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{Email, Error, Role, User, UserId, UserProfile};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Return the user for `email`, creating a customer record on first sight.
    async fn ensure_user(&self, email: &Email, profile: &UserProfile) -> Result<User, Error>;

    async fn find_user(&self, email: &Email) -> Result<Option<User>, Error>;

    async fn role_of(&self, email: &Email) -> Result<Option<Role>, Error>;

    /// Move the user to `requested`.
    async fn request_upgrade(&self, email: &Email) -> Result<User, Error>;

    async fn set_role(&self, id: &UserId, role: Role) -> Result<User, Error>;

    async fn flag_fraud(&self, id: &UserId) -> Result<User, Error>;

    async fn remove_user(&self, id: &UserId) -> Result<(), Error>;

    async fn list_users(&self) -> Result<Vec<User>, Error>;
}
