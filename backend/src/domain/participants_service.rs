//! Participant listing service.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::ports::{
    EventRepository, EventRepositoryError, ParticipantsQuery, RegistrationStore,
    RegistrationStoreError,
};
use crate::domain::{Error, EventId, Listing, UserSummary};

/// Lists the registered users of an event.
#[derive(Clone)]
pub struct ParticipantsService<E, S> {
    events: Arc<E>,
    store: Arc<S>,
}

impl<E, S> ParticipantsService<E, S> {
    /// Create a new service.
    pub fn new(events: Arc<E>, store: Arc<S>) -> Self {
        Self { events, store }
    }
}

#[async_trait]
impl<E, S> ParticipantsQuery for ParticipantsService<E, S>
where
    E: EventRepository,
    S: RegistrationStore,
{
    async fn list_participants(
        &self,
        event: EventId,
        page: PageParams,
    ) -> Result<Listing<UserSummary>, Error> {
        let exists = self
            .events
            .find_by_id(event)
            .await
            .map_err(|error| match error {
                EventRepositoryError::Connection { message } => {
                    Error::service_unavailable(format!("event repository unavailable: {message}"))
                }
                EventRepositoryError::Query { message } => {
                    Error::internal(format!("event repository error: {message}"))
                }
            })?
            .is_some();
        if !exists {
            return Err(Error::not_found(format!("event {event} not found")));
        }
        self.store
            .participants(event, page)
            .await
            .map_err(|error| match error {
                RegistrationStoreError::Connection { message } => Error::service_unavailable(
                    format!("registration store unavailable: {message}"),
                ),
                RegistrationStoreError::Query { message } => {
                    Error::internal(format!("registration store error: {message}"))
                }
            })
    }
}
