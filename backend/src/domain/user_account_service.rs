//! Account services: sign-up, login, and current-user lookups and updates.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    LoginService, NewUserRecord, UserAccounts, UserChanges, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountChanges, Error, LoginCredentials, NewAccount, PasswordDigest, User, UserId,
};

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Conflict { .. } => Error::conflict("username is already taken"),
    }
}

fn session_user_gone() -> Error {
    Error::unauthorized("session user no longer exists")
}

fn derive_digest(password: &str) -> Result<PasswordDigest, Error> {
    PasswordDigest::derive(password).map_err(|err| Error::internal(err.to_string()))
}

/// Account service implementing [`LoginService`] and [`UserAccounts`].
#[derive(Clone)]
pub struct UserAccountService<U> {
    users: Arc<U>,
}

impl<U> UserAccountService<U> {
    /// Create a service backed by `users`.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> LoginService for UserAccountService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_repository_error)?;
        match stored {
            Some(stored) if stored.password_digest.verify(credentials.password()) => {
                Ok(stored.user)
            }
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}

#[async_trait]
impl<U> UserAccounts for UserAccountService<U>
where
    U: UserRepository,
{
    async fn sign_up(&self, account: &NewAccount) -> Result<User, Error> {
        let record = NewUserRecord {
            username: account.username().clone(),
            email: account.email().cloned(),
            password_digest: derive_digest(account.password())?,
        };
        let user = self
            .users
            .create(&record)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %user.id(), "account created");
        Ok(user)
    }

    async fn current_user(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(session_user_gone)
    }

    async fn update_current_user(
        &self,
        user_id: UserId,
        changes: &AccountChanges,
    ) -> Result<User, Error> {
        if changes.is_empty() {
            return self.current_user(user_id).await;
        }
        let record = UserChanges {
            username: changes.username().cloned(),
            email: changes.email().map(|email| email.cloned()),
            password_digest: changes.password().map(derive_digest).transpose()?,
        };
        let user = self
            .users
            .update(user_id, &record)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(session_user_gone)?;
        info!(
            user_id = %user.id(),
            password_changed = record.password_digest.is_some(),
            "account updated"
        );
        Ok(user)
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
