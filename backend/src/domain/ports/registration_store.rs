//! Transactional port for registration reconciliation.
//!
//! A reconciliation opens one [`RegistrationTransaction`], performs its reads
//! and the single bulk write through it, then commits or rolls back. Adapters
//! must hold a shared lock on the event row from [`event_exists`] until the
//! transaction ends so the event cannot disappear mid-reconciliation.
//!
//! [`event_exists`]: RegistrationTransaction::event_exists

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageParams;

use crate::domain::{EventId, Listing, UserId, UserSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by registration store adapters.
    pub enum RegistrationStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "registration store connection failed: {message}",
        /// Query, mutation, or transaction control failed.
        Query { message: String } => "registration store query failed: {message}",
    }
}

/// Entry point for registration reads and transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Open a transaction.
    async fn begin(&self) -> Result<Box<dyn RegistrationTransaction>, RegistrationStoreError>;

    /// Distinct registered users of `event`, ordered by user id.
    async fn participants(
        &self,
        event: EventId,
        page: PageParams,
    ) -> Result<Listing<UserSummary>, RegistrationStoreError>;
}

/// One open transaction against the registration tables.
///
/// Dropping a transaction without committing rolls it back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationTransaction: Send {
    /// Whether `event` exists; locks the row for the rest of the transaction.
    async fn event_exists(&mut self, event: EventId) -> Result<bool, RegistrationStoreError>;

    /// Identifiers in `ids` with no matching user, ascending.
    async fn missing_users(
        &mut self,
        ids: &[UserId],
    ) -> Result<Vec<UserId>, RegistrationStoreError>;

    /// Identifiers in `ids` already registered for `event`, ascending.
    async fn registered_participants(
        &mut self,
        event: EventId,
        ids: &[UserId],
    ) -> Result<Vec<UserId>, RegistrationStoreError>;

    /// Insert registrations, skipping pairs that already exist.
    ///
    /// Returns the identifiers actually inserted.
    async fn insert_registrations(
        &mut self,
        event: EventId,
        ids: &[UserId],
        registered_at: DateTime<Utc>,
    ) -> Result<Vec<UserId>, RegistrationStoreError>;

    /// Delete registrations of `ids` for `event`, returning the deleted ids.
    async fn delete_registrations(
        &mut self,
        event: EventId,
        ids: &[UserId],
    ) -> Result<Vec<UserId>, RegistrationStoreError>;

    /// Commit the transaction.
    async fn commit(&mut self) -> Result<(), RegistrationStoreError>;

    /// Roll the transaction back.
    async fn rollback(&mut self) -> Result<(), RegistrationStoreError>;
}
