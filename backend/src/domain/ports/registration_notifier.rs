//! Port invoked by the notification worker for each queued job.

use async_trait::async_trait;

use crate::domain::{Error, EventId, UserId};

/// Sends one registration confirmation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationNotifier: Send + Sync {
    /// Confirm that `user` is registered for `event`.
    ///
    /// Returns `Ok(true)` when a message was handed to the transport and
    /// `Ok(false)` when nothing was sent (missing user or event, no address,
    /// or a silenced transport failure).
    async fn notify(&self, user: UserId, event: EventId) -> Result<bool, Error>;
}
