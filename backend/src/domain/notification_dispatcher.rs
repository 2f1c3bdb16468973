//! Registration confirmation dispatcher.
//!
//! Runs on the notification worker, never on the request path. Every outcome
//! is logged; only a transport failure with `fail_silently` disabled becomes
//! an error, and the worker logs that too.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use tracing::{info, warn};

use crate::domain::ports::{EventRepository, Mailer, RegistrationNotifier, UserRepository};
use crate::domain::{Error, EventId, UserId, render_registration_confirmation};

/// Sender settings for confirmation mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// `From` address.
    pub from: String,
    /// Log transport failures instead of returning them.
    pub fail_silently: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            from: "noreply@localhost".to_owned(),
            fail_silently: true,
        }
    }
}

/// Builds and sends one confirmation per (user, event) pair.
#[derive(Clone)]
pub struct NotificationDispatcher<U, E, M> {
    users: Arc<U>,
    events: Arc<E>,
    mailer: Arc<M>,
    settings: DispatchSettings,
}

impl<U, E, M> NotificationDispatcher<U, E, M> {
    /// Create a dispatcher.
    pub fn new(users: Arc<U>, events: Arc<E>, mailer: Arc<M>, settings: DispatchSettings) -> Self {
        Self {
            users,
            events,
            mailer,
            settings,
        }
    }
}

#[async_trait]
impl<U, E, M> RegistrationNotifier for NotificationDispatcher<U, E, M>
where
    U: UserRepository,
    E: EventRepository,
    M: Mailer,
{
    async fn notify(&self, user_id: UserId, event_id: EventId) -> Result<bool, Error> {
        let user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(%user_id, %event_id, "notification skipped: user not found");
                return Ok(false);
            }
            Err(error) => {
                warn!(%error, %user_id, "notification skipped: user lookup failed");
                return Ok(false);
            }
        };
        let event = match self.events.find_by_id(event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                warn!(%user_id, %event_id, "notification skipped: event not found");
                return Ok(false);
            }
            Err(error) => {
                warn!(%error, %event_id, "notification skipped: event lookup failed");
                return Ok(false);
            }
        };
        let Some(email) =
            render_registration_confirmation(&user, &event, &self.settings.from, &Local)
        else {
            info!(%user_id, %event_id, "notification skipped: user has no email");
            return Ok(false);
        };

        match self.mailer.send(&email).await {
            Ok(()) => {
                info!(%user_id, %event_id, "registration confirmation sent");
                Ok(true)
            }
            Err(error) if self.settings.fail_silently => {
                warn!(%error, %user_id, %event_id, "registration confirmation failed");
                Ok(false)
            }
            Err(error) => Err(Error::service_unavailable(format!(
                "registration confirmation failed: {error}"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "notification_dispatcher_tests.rs"]
mod tests;
