//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the registration store, the notification queue,
//! and the mailer) describe what the domain needs from infrastructure. Each
//! exposes a strongly typed error generated by `define_port_error!`. Driving
//! ports are the use-cases inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod event_command;
mod event_query;
mod event_repository;
mod login_service;
mod mailer;
mod notification_queue;
mod participants_query;
mod registration_command;
mod registration_notifier;
mod registration_store;
mod user_accounts;
mod user_repository;

#[cfg(test)]
pub use event_command::MockEventCommand;
pub use event_command::EventCommand;
#[cfg(test)]
pub use event_query::MockEventQuery;
pub use event_query::EventQuery;
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventRepository, EventRepositoryError, NewEventRecord};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{Mailer, MailerError};
#[cfg(test)]
pub use notification_queue::MockNotificationQueue;
pub use notification_queue::{JobDispatchError, NotificationQueue};
#[cfg(test)]
pub use participants_query::MockParticipantsQuery;
pub use participants_query::ParticipantsQuery;
#[cfg(test)]
pub use registration_command::MockRegistrationCommand;
pub use registration_command::RegistrationCommand;
#[cfg(test)]
pub use registration_notifier::MockRegistrationNotifier;
pub use registration_notifier::RegistrationNotifier;
#[cfg(test)]
pub use registration_store::{MockRegistrationStore, MockRegistrationTransaction};
pub use registration_store::{
    RegistrationStore, RegistrationStoreError, RegistrationTransaction,
};
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::UserAccounts;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    NewUserRecord, StoredCredentials, UserChanges, UserPersistenceError, UserRepository,
};
