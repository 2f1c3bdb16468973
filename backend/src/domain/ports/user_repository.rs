//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, PasswordDigest, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique constraint rejected the write.
        Conflict { message: String } => "user already exists: {message}",
    }
}

/// Values persisted when an account is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Requested login name.
    pub username: Username,
    /// Optional contact address.
    pub email: Option<EmailAddress>,
    /// Salted password digest.
    pub password_digest: PasswordDigest,
}

/// Column changes for an existing account. `None` leaves a column alone;
/// `email: Some(None)` clears the address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// New login name.
    pub username: Option<Username>,
    /// New contact address, or `Some(None)` to clear it.
    pub email: Option<Option<EmailAddress>>,
    /// Digest of a new password.
    pub password_digest: Option<PasswordDigest>,
}

impl UserChanges {
    /// Whether no column is being changed.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password_digest.is_none()
    }
}

/// User row together with the stored password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Account owning the digest.
    pub user: User,
    /// Digest to verify login attempts against.
    pub password_digest: PasswordDigest,
}

/// Port for reading, creating and updating user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Duplicate usernames yield `Conflict`.
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Apply `changes` to an account, returning `None` when it does not
    /// exist. A username already held by another account yields `Conflict`.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and their digest by exact username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;
}
