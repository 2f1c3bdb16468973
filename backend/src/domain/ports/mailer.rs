//! Port for outbound mail delivery.
use async_trait::async_trait;

use crate::domain::OutgoingEmail;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail transports.
    pub enum MailerError {
        /// The message could not be built from its parts.
        Message { message: String } => "mail message is invalid: {message}",
        /// The transport refused or failed to deliver the message.
        Transport { message: String } => "mail transport failed: {message}",
    }
}

/// Delivers rendered messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send `email`.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError>;
}
