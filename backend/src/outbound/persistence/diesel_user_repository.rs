//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Status changes that depend on the current status are single conditional
//! `UPDATE` statements, so two racing requests cannot both observe the same
//! prior state.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, Role, User, UserId, UserProfile, UserRegistration, UserStatus};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(error, UserPersistenceError::query, UserPersistenceError::connection)
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let corrupt = |field: &str| {
        warn!(user_id = %row.id, field, "stored user row failed validation");
        UserPersistenceError::query("stored user row is invalid")
    };
    let email = Email::new(&row.email).map_err(|_| corrupt("email"))?;
    let role = row.role.parse::<Role>().map_err(|_| corrupt("role"))?;
    let status = row
        .status
        .parse::<UserStatus>()
        .map_err(|_| corrupt("status"))?;
    let profile = UserProfile::new(row.name.clone(), row.photo_url.clone())
        .map_err(|_| corrupt("profile"))?;
    Ok(User::from_parts(
        UserId::from_uuid(row.id),
        email,
        role,
        status,
        profile,
        row.created_at,
    ))
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    rows.into_iter().map(row_to_user).collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert_if_absent(
        &self,
        registration: &UserRegistration,
    ) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let new_row = NewUserRow {
            email: registration.email.as_ref(),
            role: Role::Customer.as_str(),
            status: UserStatus::None.as_str(),
            name: registration.profile.name(),
            photo_url: registration.profile.photo_url(),
            created_at: registration.created_at,
            updated_at: registration.created_at,
        };

        let inserted: Option<UserRow> = diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict(users::email)
            .do_nothing()
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        let row = match inserted {
            Some(row) => row,
            None => users::table
                .filter(users::email.eq(registration.email.as_ref()))
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .map_err(diesel_error)?,
        };
        row_to_user(row)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_users(rows)
    }

    async fn compare_and_set_status(
        &self,
        id: &UserId,
        expected: UserStatus,
        next: UserStatus,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(
            users::table
                .filter(users::id.eq(id.as_uuid()))
                .filter(users::status.eq(expected.as_str())),
        )
        .set((
            users::status.eq(next.as_str()),
            users::updated_at.eq(diesel::dsl::now),
        ))
        .returning(UserRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?
        .map(row_to_user)
        .transpose()
    }

    async fn set_status(
        &self,
        id: &UserId,
        status: UserStatus,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::status.eq(status.as_str()),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn set_role(&self, id: &UserId, role: Role) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::role.eq(role.as_str()),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed = diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(removed > 0)
    }
}
