//! User registry domain service.
//!
//! Implements the [`UserRegistry`] driving port on top of a
//! [`UserRepository`]. Status changes that depend on the current status go
//! through the repository's compare-and-set so concurrent requests cannot
//! both succeed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{UserPersistenceError, UserRegistry, UserRepository};
use crate::domain::{
    Email, Error, Role, User, UserId, UserProfile, UserRegistration, UserStatus,
    UserTransitionError,
};

/// Attempts before a contended status change gives up with `Conflict`.
const MAX_STATUS_ATTEMPTS: usize = 3;

pub(crate) const USER_NOT_FOUND: &str = "User not found";

/// User registry service implementing the driving port.
#[derive(Clone)]
pub struct UserRegistryService<R: ?Sized> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> UserRegistryService<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    if error.is_unavailable() {
        warn!(%error, "user repository unavailable");
        return Error::service_unavailable("user store is temporarily unavailable");
    }
    Error::internal(error.to_string())
}

fn map_transition_error(error: UserTransitionError) -> Error {
    let code = match error {
        UserTransitionError::AlreadyRequested => "already_requested",
        UserTransitionError::FraudFlagged => "invalid_transition",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "code": code }))
}

fn not_found() -> Error {
    Error::not_found(USER_NOT_FOUND)
}

#[async_trait]
impl<R> UserRegistry for UserRegistryService<R>
where
    R: UserRepository + ?Sized,
{
    async fn ensure_user(&self, email: &Email, profile: &UserProfile) -> Result<User, Error> {
        let registration = UserRegistration {
            email: email.clone(),
            profile: profile.clone(),
            created_at: self.clock.utc(),
        };
        self.repo
            .insert_if_absent(&registration)
            .await
            .map_err(map_persistence_error)
    }

    async fn find_user(&self, email: &Email) -> Result<Option<User>, Error> {
        self.repo
            .find_by_email(email)
            .await
            .map_err(map_persistence_error)
    }

    async fn role_of(&self, email: &Email) -> Result<Option<Role>, Error> {
        Ok(self.find_user(email).await?.map(|user| user.role()))
    }

    async fn request_upgrade(&self, email: &Email) -> Result<User, Error> {
        for attempt in 1..=MAX_STATUS_ATTEMPTS {
            let user = self.find_user(email).await?.ok_or_else(not_found)?;
            let next = user
                .status()
                .request_upgrade()
                .map_err(map_transition_error)?;

            let updated = self
                .repo
                .compare_and_set_status(user.id(), user.status(), next)
                .await
                .map_err(map_persistence_error)?;
            if let Some(updated) = updated {
                info!(user_id = %updated.id(), "upgrade requested");
                return Ok(updated);
            }
            debug!(attempt, user_id = %user.id(), "user status changed concurrently");
        }
        Err(Error::conflict("user status changed concurrently; retry"))
    }

    async fn set_role(&self, id: &UserId, role: Role) -> Result<User, Error> {
        let user = self
            .repo
            .set_role(id, role)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(not_found)?;
        info!(user_id = %id, role = %role, "role changed");
        Ok(user)
    }

    async fn flag_fraud(&self, id: &UserId) -> Result<User, Error> {
        let user = self
            .repo
            .set_status(id, UserStatus::Fraud)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(not_found)?;
        info!(user_id = %id, "user flagged as fraud");
        Ok(user)
    }

    async fn remove_user(&self, id: &UserId) -> Result<(), Error> {
        let removed = self.repo.delete(id).await.map_err(map_persistence_error)?;
        if !removed {
            return Err(not_found());
        }
        info!(user_id = %id, "user removed");
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.repo.list().await.map_err(map_persistence_error)
    }
}

#[cfg(test)]
#[path = "user_registry_service_tests.rs"]
mod tests;
