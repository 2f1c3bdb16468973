//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Usernames are unique at the database level; a violated constraint on
//! insert or rename surfaces as `UserPersistenceError::Conflict`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{
    NewUserRecord, StoredCredentials, UserChanges, UserPersistenceError, UserRepository,
};
use crate::domain::{EmailAddress, PasswordDigest, User, UserId, Username};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::models::{CredentialsRow, NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    if let Some(constraint) = unique_violation(&error) {
        debug!(%constraint, "user write hit a unique constraint");
        return UserPersistenceError::conflict(constraint);
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Convert a database row into a validated domain user.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let invalid = |err: crate::domain::UserValidationError| {
        UserPersistenceError::query(format!("invalid user row {}: {err}", row.id))
    };
    let id = UserId::new(row.id).map_err(invalid)?;
    let username = Username::new(row.username.clone()).map_err(invalid)?;
    let email = row
        .email
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(EmailAddress::new)
        .transpose()
        .map_err(invalid)?;
    Ok(User::new(id, username, email, row.is_staff))
}

fn to_changeset(changes: &UserChanges) -> UserChangeset<'_> {
    UserChangeset {
        username: changes.username.as_ref().map(AsRef::as_ref),
        email: changes
            .email
            .as_ref()
            .map(|email| email.as_ref().map(AsRef::as_ref)),
        password_digest: changes
            .password_digest
            .as_ref()
            .map(PasswordDigest::as_encoded),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            username: record.username.as_ref(),
            email: record.email.as_ref().map(AsRef::as_ref),
            is_staff: false,
            password_digest: record.password_digest.as_encoded(),
        };
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = diesel::update(users::table.find(id.get()))
            .set(&to_changeset(changes))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CredentialsRow> = users::table
            .filter(users::username.eq(username))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            Ok(StoredCredentials {
                user: row_to_user(row.user)?,
                password_digest: PasswordDigest::from_encoded(row.password_digest),
            })
        })
        .transpose()
    }
}
