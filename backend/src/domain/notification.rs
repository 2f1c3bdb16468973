//! Registration confirmation jobs and message rendering.

use chrono::TimeZone;

use crate::domain::{EmailAddress, Event, EventId, TraceId, User, UserId};

/// Work item asking the dispatcher to confirm one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationNotificationJob {
    /// Registered participant.
    pub user_id: UserId,
    /// Event they registered for.
    pub event_id: EventId,
    /// Trace of the request that scheduled the job.
    pub trace_id: Option<TraceId>,
}

impl RegistrationNotificationJob {
    /// Build a job, capturing the ambient trace id.
    pub fn new(user_id: UserId, event_id: EventId) -> Self {
        Self {
            user_id,
            event_id,
            trace_id: TraceId::current(),
        }
    }
}

/// Plain-text message ready for a mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: EmailAddress,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
}

/// Render the confirmation for `user` attending `event`.
///
/// The event date is shown in `tz` as `YYYY-MM-DD HH:MM`.
///
/// Returns `None` when the user has no email address.
pub fn render_registration_confirmation<Tz>(
    user: &User,
    event: &Event,
    from: &str,
    tz: &Tz,
) -> Option<OutgoingEmail>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let to = user.email()?.clone();
    let when = event.date().with_timezone(tz).format("%Y-%m-%d %H:%M");
    Some(OutgoingEmail {
        from: from.to_owned(),
        to,
        subject: format!("Registration confirmed: {}", event.title()),
        body: format!(
            "Hi {username},\n\nYou are registered for '{title}' on {when} at {location}.\nOrganizer: {organizer}\n",
            username = user.username(),
            title = event.title(),
            location = event.location(),
            organizer = event.organizer().username,
        ),
    })
}
