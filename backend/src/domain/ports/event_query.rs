//! Driving port for event reads.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::{Error, Event, EventFilter, EventId, Listing};

/// Event read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventQuery: Send + Sync {
    /// Fetch one event; `NotFound` when missing.
    async fn get(&self, id: EventId) -> Result<Event, Error>;

    /// List events matching `filter`, ordered by date then title.
    async fn list(&self, filter: EventFilter, page: PageParams) -> Result<Listing<Event>, Error>;
}
