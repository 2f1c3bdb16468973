//! Driving port for participant listings.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::{Error, EventId, Listing, UserSummary};

/// Participant listing use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParticipantsQuery: Send + Sync {
    /// Registered users of `event`, ordered by id; `NotFound` when missing.
    async fn list_participants(
        &self,
        event: EventId,
        page: PageParams,
    ) -> Result<Listing<UserSummary>, Error>;
}
