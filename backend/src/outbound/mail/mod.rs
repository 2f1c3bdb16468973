//! Mail transports implementing the `Mailer` port.
//!
//! - [`SmtpMailer`] delivers through an SMTP relay with `lettre`.
//! - [`LoggingMailer`] writes the message to the log instead; it is used when
//!   no SMTP host is configured.

mod logging;
mod smtp;

pub use logging::LoggingMailer;
pub use smtp::{SmtpMailer, SmtpSettings};
