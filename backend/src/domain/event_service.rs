//! Event domain services.
//!
//! Implements the event command and query driving ports. Organisers are taken
//! from the authenticated caller, never from payloads, and only the organiser
//! or a staff user may modify an existing event.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::PageParams;
use tracing::info;

use crate::domain::ports::{
    EventCommand, EventQuery, EventRepository, EventRepositoryError, NewEventRecord,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, Event, EventChanges, EventDraft, EventFilter, EventId, Listing, UserId,
};

fn map_event_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("event repository unavailable: {message}"))
        }
        EventRepositoryError::Query { message } => {
            Error::internal(format!("event repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } | UserPersistenceError::Conflict { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn event_not_found(id: EventId) -> Error {
    Error::not_found(format!("event {id} not found"))
}

/// Event service implementing [`EventCommand`] and [`EventQuery`].
#[derive(Clone)]
pub struct EventService<E, U> {
    events: Arc<E>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<E, U> EventService<E, U> {
    /// Create a new service.
    pub fn new(events: Arc<E>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            events,
            users,
            clock,
        }
    }
}

impl<E, U> EventService<E, U>
where
    E: EventRepository,
    U: UserRepository,
{
    async fn load(&self, id: EventId) -> Result<Event, Error> {
        self.events
            .find_by_id(id)
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| event_not_found(id))
    }

    async fn ensure_can_manage(&self, caller: UserId, event: &Event) -> Result<(), Error> {
        if event.is_organized_by(caller) {
            return Ok(());
        }
        let is_staff = self
            .users
            .find_by_id(caller)
            .await
            .map_err(map_user_error)?
            .is_some_and(|user| user.is_staff());
        if is_staff {
            Ok(())
        } else {
            Err(Error::forbidden(
                "only the organizer or a staff user may modify this event",
            ))
        }
    }
}

#[async_trait]
impl<E, U> EventCommand for EventService<E, U>
where
    E: EventRepository,
    U: UserRepository,
{
    async fn create(&self, caller: UserId, draft: EventDraft) -> Result<Event, Error> {
        let organizer = self
            .users
            .find_by_id(caller)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))?;
        let record = NewEventRecord {
            draft,
            organizer: organizer.id(),
            created_at: self.clock.utc(),
        };
        let event = self
            .events
            .create(&record)
            .await
            .map_err(map_event_error)?;
        info!(event_id = %event.id(), organizer = %caller, "event created");
        Ok(event)
    }

    async fn update(
        &self,
        caller: UserId,
        id: EventId,
        changes: EventChanges,
    ) -> Result<Event, Error> {
        let current = self.load(id).await?;
        self.ensure_can_manage(caller, &current).await?;
        if changes.is_empty() {
            return Ok(current);
        }
        self.events
            .update(id, &changes, self.clock.utc())
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| event_not_found(id))
    }

    async fn delete(&self, caller: UserId, id: EventId) -> Result<(), Error> {
        let current = self.load(id).await?;
        self.ensure_can_manage(caller, &current).await?;
        let removed = self.events.delete(id).await.map_err(map_event_error)?;
        if !removed {
            return Err(event_not_found(id));
        }
        info!(event_id = %id, caller = %caller, "event deleted");
        Ok(())
    }
}

#[async_trait]
impl<E, U> EventQuery for EventService<E, U>
where
    E: EventRepository,
    U: UserRepository,
{
    async fn get(&self, id: EventId) -> Result<Event, Error> {
        self.load(id).await
    }

    async fn list(&self, filter: EventFilter, page: PageParams) -> Result<Listing<Event>, Error> {
        self.events
            .list(&filter, page)
            .await
            .map_err(map_event_error)
    }
}

#[cfg(test)]
#[path = "event_service_tests.rs"]
mod tests;
