//! Builders wiring Diesel adapters into the HTTP state and the notifier.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use events_backend::domain::ports::{Mailer, MailerError, RegistrationNotifier};
use events_backend::domain::{
    EventService, NotificationDispatcher, OutgoingEmail, ParticipantsService, RegistrationService,
    UserAccountService,
};
use events_backend::inbound::http::state::{HttpState, HttpStatePorts};
use events_backend::outbound::mail::{LoggingMailer, SmtpMailer, SmtpSettings};
use events_backend::outbound::persistence::{
    DbPool, DieselEventRepository, DieselRegistrationStore, DieselUserRepository,
};
use events_backend::outbound::queue::TokioNotificationQueue;
use tracing::info;

use super::ServerConfig;

/// Mail transport selected from configuration.
pub(super) enum ConfiguredMailer {
    Smtp(SmtpMailer),
    Logging(LoggingMailer),
}

#[async_trait]
impl Mailer for ConfiguredMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        match self {
            Self::Smtp(mailer) => mailer.send(email).await,
            Self::Logging(mailer) => mailer.send(email).await,
        }
    }
}

/// Pick the SMTP transport when a relay is configured, else log messages.
pub(super) fn configured_mailer(
    smtp: Option<&SmtpSettings>,
) -> Result<ConfiguredMailer, MailerError> {
    match smtp {
        Some(settings) => {
            info!(host = %settings.host, port = settings.port, "confirmation mail via SMTP");
            SmtpMailer::new(settings).map(ConfiguredMailer::Smtp)
        }
        None => {
            info!("no SMTP host configured; confirmation mail will be logged");
            Ok(ConfiguredMailer::Logging(LoggingMailer))
        }
    }
}

/// Build the confirmation dispatcher run by the notification worker.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the SMTP transport cannot be configured.
pub(super) fn build_notifier(
    config: &ServerConfig,
) -> std::io::Result<Arc<dyn RegistrationNotifier>> {
    let mailer = configured_mailer(config.smtp.as_ref())
        .map_err(|err| std::io::Error::other(format!("mail transport setup failed: {err}")))?;
    Ok(Arc::new(NotificationDispatcher::new(
        Arc::new(DieselUserRepository::new(config.db_pool.clone())),
        Arc::new(DieselEventRepository::new(config.db_pool.clone())),
        Arc::new(mailer),
        config.dispatch.clone(),
    )))
}

/// Build the driving ports over the Diesel adapters.
fn build_ports(
    pool: &DbPool,
    queue: Arc<TokioNotificationQueue>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let events = Arc::new(DieselEventRepository::new(pool.clone()));
    let store = Arc::new(DieselRegistrationStore::new(pool.clone()));

    let accounts = Arc::new(UserAccountService::new(Arc::clone(&users)));
    let event_service = Arc::new(EventService::new(
        Arc::clone(&events),
        users,
        Arc::clone(&clock),
    ));
    let registrations = Arc::new(RegistrationService::new(Arc::clone(&store), queue, clock));
    let participants = Arc::new(ParticipantsService::new(events, store));

    HttpStatePorts {
        login: Arc::clone(&accounts) as _,
        accounts,
        events: Arc::clone(&event_service) as _,
        events_query: event_service,
        registrations,
        participants,
    }
}

/// Build the shared HTTP state from the configured pool and queue.
pub(super) fn build_http_state(
    config: &ServerConfig,
    queue: Arc<TokioNotificationQueue>,
) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(build_ports(
        &config.db_pool,
        queue,
        Arc::new(DefaultClock),
    )))
}
