//! SMTP transport built on `lettre`.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::OutgoingEmail;
use crate::domain::ports::{Mailer, MailerError};

/// Connection settings for [`SmtpMailer`].
#[derive(Clone)]
pub struct SmtpSettings {
    /// Relay host name.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Upgrade the connection with STARTTLS.
    pub starttls: bool,
    /// Login name, when the relay requires authentication.
    pub username: Option<String>,
    /// Password paired with `username`.
    pub password: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("starttls", &self.starttls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Sends confirmation mail through an SMTP relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build a mailer for `settings`.
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Transport` when the relay cannot be configured
    /// for STARTTLS.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailerError> {
        let relay = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|err| MailerError::transport(format!("SMTP relay error: {err}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };
        let mut builder = relay.port(settings.port);
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.as_str().to_owned(),
            ));
        }
        Ok(Self {
            transport: builder.build(),
        })
    }
}

/// Convert a rendered message into a `lettre` message.
pub(crate) fn build_message(email: &OutgoingEmail) -> Result<Message, MailerError> {
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|err| MailerError::message(format!("invalid from address: {err}")))?;
    let to: Mailbox = email
        .to
        .as_ref()
        .parse()
        .map_err(|err| MailerError::message(format!("invalid to address: {err}")))?;
    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|err| MailerError::message(format!("failed to build email: {err}")))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        let message = build_message(email)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|err| MailerError::transport(format!("failed to send email: {err}")))?;
        debug!(code = %response.code(), to = email.to.as_ref(), "mail accepted by relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmailAddress;
    use rstest::rstest;

    fn email(from: &str) -> OutgoingEmail {
        OutgoingEmail {
            from: from.to_owned(),
            to: EmailAddress::new("ada@example.org").expect("email"),
            subject: "Registration confirmed: Rust meetup".to_owned(),
            body: "Hi ada,\n\nYou are registered.\n".to_owned(),
        }
    }

    #[rstest]
    #[case("noreply@events.example")]
    #[case("Events <noreply@events.example>")]
    fn message_carries_headers_and_body(#[case] from: &str) {
        let message = build_message(&email(from)).expect("message");
        let formatted = String::from_utf8(message.formatted()).expect("utf-8");

        assert!(formatted.contains("To: ada@example.org"), "{formatted}");
        assert!(
            formatted.contains("Subject: Registration confirmed: Rust meetup"),
            "{formatted}"
        );
        assert!(formatted.contains("You are registered."), "{formatted}");
    }

    #[rstest]
    fn invalid_sender_is_a_message_error() {
        let err = build_message(&email("not an address")).expect_err("invalid from");
        assert!(matches!(err, MailerError::Message { .. }), "{err:?}");
    }

    #[rstest]
    fn debug_output_redacts_password() {
        let settings = SmtpSettings {
            host: "smtp.example.org".to_owned(),
            port: 587,
            starttls: true,
            username: Some("mailer".to_owned()),
            password: Some(Zeroizing::new("hunter2".to_owned())),
        };

        let rendered = format!("{settings:?}");

        assert!(!rendered.contains("hunter2"), "{rendered}");
        assert!(rendered.contains("<redacted>"), "{rendered}");
    }

    #[rstest]
    fn plain_relay_builds_without_tls() {
        let settings = SmtpSettings {
            host: "localhost".to_owned(),
            port: 1025,
            starttls: false,
            username: None,
            password: None,
        };

        assert!(SmtpMailer::new(&settings).is_ok());
    }
}
