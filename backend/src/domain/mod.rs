//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, the ports through which the domain talks to the outside, and the
//! services implementing the driving ports. Types are immutable once
//! validated; invariants and serialisation contracts live in each type's
//! Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - User, UserId, Username, EmailAddress: account identity.
//! - Event, EventDraft, EventChanges, EventFilter: the event aggregate.
//! - ParticipantBatch plus the registration outcomes.
//! - AfterCommit: side effects bound to a successful commit.
//! - Services: EventService, RegistrationService, ParticipantsService,
//!   UserAccountService, NotificationDispatcher.

pub mod after_commit;
pub mod auth;
pub mod error;
pub mod event;
pub mod event_service;
pub mod listing;
pub mod notification;
pub mod notification_dispatcher;
pub mod participants_service;
pub mod password;
pub mod ports;
pub mod registration;
pub mod registration_service;
pub mod trace_id;
pub mod user;
pub mod user_account_service;

pub use self::after_commit::AfterCommit;
pub use self::auth::{
    AccountChanges, LoginCredentials, LoginValidationError, NewAccount, PASSWORD_MIN_LEN,
    SignUpValidationError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::event::{
    Event, EventChanges, EventDraft, EventFilter, EventId, EventParts, EventValidationError,
    LOCATION_MAX, TITLE_MAX,
};
pub use self::event_service::EventService;
pub use self::listing::Listing;
pub use self::notification::{
    OutgoingEmail, RegistrationNotificationJob, render_registration_confirmation,
};
pub use self::notification_dispatcher::{DispatchSettings, NotificationDispatcher};
pub use self::participants_service::ParticipantsService;
pub use self::password::{PasswordDigest, PasswordDigestError};
pub use self::registration::{
    ParticipantBatch, ParticipantBatchError, RegistrationOutcome, RegistrationStatus,
    UnregistrationOutcome,
};
pub use self::registration_service::RegistrationService;
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, USERNAME_MAX, User, UserId, UserSummary, UserValidationError, Username,
};
pub use self::user_account_service::UserAccountService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use events_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
