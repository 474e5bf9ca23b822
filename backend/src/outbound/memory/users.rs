//! In-memory `UserRepository`.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, Role, User, UserId, UserRegistration, UserStatus};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<User>>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }

    fn update<F>(&self, id: &UserId, apply: F) -> Result<Option<User>, UserPersistenceError>
    where
        F: FnOnce(&mut User) -> bool,
    {
        let mut users = self.lock()?;
        let Some(user) = users.iter_mut().find(|user| user.id() == id) else {
            return Ok(None);
        };
        Ok(apply(&mut *user).then(|| user.clone()))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert_if_absent(
        &self,
        registration: &UserRegistration,
    ) -> Result<User, UserPersistenceError> {
        let mut users = self.lock()?;
        if let Some(existing) = users.iter().find(|user| user.email() == &registration.email) {
            return Ok(existing.clone());
        }
        let user = User::from_parts(
            UserId::random(),
            registration.email.clone(),
            Role::Customer,
            UserStatus::None,
            registration.profile.clone(),
            registration.created_at,
        );
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.iter().find(|user| user.email() == email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.iter().find(|user| user.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users = self.lock()?.clone();
        users.sort_by_key(User::created_at);
        Ok(users)
    }

    async fn compare_and_set_status(
        &self,
        id: &UserId,
        expected: UserStatus,
        next: UserStatus,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.update(id, |user| {
            if user.status() != expected {
                return false;
            }
            *user = user.clone().with_status(next);
            true
        })
    }

    async fn set_status(
        &self,
        id: &UserId,
        status: UserStatus,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.update(id, |user| {
            *user = user.clone().with_status(status);
            true
        })
    }

    async fn set_role(&self, id: &UserId, role: Role) -> Result<Option<User>, UserPersistenceError> {
        self.update(id, |user| {
            *user = user.clone().with_role(role);
            true
        })
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut users = self.lock()?;
        let before = users.len();
        users.retain(|user| user.id() != id);
        Ok(users.len() != before)
    }
}
