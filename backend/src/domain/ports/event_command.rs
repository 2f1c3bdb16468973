//! Driving port for event mutations.

use async_trait::async_trait;

use crate::domain::{Error, Event, EventChanges, EventDraft, EventId, UserId};

/// Event write use-cases.
///
/// Updates and deletes are limited to the organiser and staff users; other
/// callers receive `Forbidden`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventCommand: Send + Sync {
    /// Create an event organised by `caller`.
    async fn create(&self, caller: UserId, draft: EventDraft) -> Result<Event, Error>;

    /// Apply a partial update.
    async fn update(
        &self,
        caller: UserId,
        id: EventId,
        changes: EventChanges,
    ) -> Result<Event, Error>;

    /// Delete an event and its registrations.
    async fn delete(&self, caller: UserId, id: EventId) -> Result<(), Error>;
}
