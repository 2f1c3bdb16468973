//! Driving port for account sign-up and profile reads and updates.

use async_trait::async_trait;

use crate::domain::{AccountChanges, Error, NewAccount, User, UserId};

/// Account use-cases exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// Create an account. Duplicate usernames yield `Conflict`.
    async fn sign_up(&self, account: &NewAccount) -> Result<User, Error>;

    /// Load the account behind an authenticated session.
    ///
    /// A session pointing at a deleted account yields `Unauthorized`.
    async fn current_user(&self, user_id: UserId) -> Result<User, Error>;

    /// Apply `changes` to the caller's own account.
    ///
    /// A new password is re-digested; a taken username yields `Conflict`
    /// and a deleted account yields `Unauthorized`.
    async fn update_current_user(
        &self,
        user_id: UserId,
        changes: &AccountChanges,
    ) -> Result<User, Error>;
}
