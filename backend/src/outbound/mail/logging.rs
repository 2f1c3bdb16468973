//! Mailer that logs messages instead of sending them.

use async_trait::async_trait;
use tracing::info;

use crate::domain::OutgoingEmail;
use crate::domain::ports::{Mailer, MailerError};

/// Development transport: every message becomes one `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        info!(
            from = %email.from,
            to = email.to.as_ref(),
            subject = %email.subject,
            body = %email.body,
            "mail delivery skipped; logging message instead"
        );
        Ok(())
    }
}
