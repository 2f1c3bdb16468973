//! Port for event persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageParams;

use crate::domain::{Event, EventChanges, EventDraft, EventFilter, EventId, Listing, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event repository adapters.
    pub enum EventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "event repository query failed: {message}",
    }
}

/// Values persisted when an event is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEventRecord {
    /// Validated event fields.
    pub draft: EventDraft,
    /// Owning user.
    pub organizer: UserId,
    /// Creation time, also used as the first `updated_at`.
    pub created_at: DateTime<Utc>,
}

/// Port for storing and querying events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert an event and return it with its organiser resolved.
    async fn create(&self, record: &NewEventRecord) -> Result<Event, EventRepositoryError>;

    /// Fetch an event by identifier.
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, EventRepositoryError>;

    /// List events matching `filter`, ordered by date then title.
    async fn list(
        &self,
        filter: &EventFilter,
        page: PageParams,
    ) -> Result<Listing<Event>, EventRepositoryError>;

    /// Apply `changes`; `None` when the event does not exist.
    async fn update(
        &self,
        id: EventId,
        changes: &EventChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Event>, EventRepositoryError>;

    /// Delete an event and, by cascade, its registrations.
    ///
    /// Returns whether a row was removed.
    async fn delete(&self, id: EventId) -> Result<bool, EventRepositoryError>;
}
