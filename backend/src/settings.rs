//! Application settings loaded via OrthoConfig.
//!
//! Values come from command-line flags and `EVENTS_*` environment variables.
//! Optional fields fall back to the defaults exposed by the accessor methods.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::DispatchSettings;
use crate::inbound::http::session_config::SessionToggles;
use crate::outbound::mail::SmtpSettings;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not a `host:port` socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// No database URL was configured.
    #[error("EVENTS_DATABASE_URL must be set")]
    MissingDatabaseUrl,
}

/// Runtime configuration for the events backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EVENTS")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// File holding the cookie signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure` (`true` or `false`); release builds
    /// refuse to start when unset.
    pub session_cookie_secure: Option<String>,
    /// `SameSite` policy: `Strict`, `Lax`, or `None`.
    pub session_same_site: Option<String>,
    /// Permit a generated session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// SMTP relay host; confirmation mail is only logged when unset.
    pub smtp_host: Option<String>,
    /// SMTP relay port.
    pub smtp_port: Option<u16>,
    /// Upgrade SMTP connections with STARTTLS.
    #[ortho_config(default = true)]
    pub smtp_starttls: bool,
    /// SMTP login name.
    pub smtp_username: Option<String>,
    /// SMTP password.
    pub smtp_password: Option<String>,
    /// Sender address for confirmation mail.
    pub mail_from: Option<String>,
    /// Log mail transport failures instead of reporting them to the worker.
    #[ortho_config(default = true)]
    pub mail_fail_silently: bool,
}

impl AppSettings {
    /// Parse the configured bind address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Connection pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no URL is set.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;
        Ok(PoolConfig::new(url).with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_SIZE)))
    }

    /// Session toggles as configured, before build-mode validation.
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self.session_key_file.clone(),
            cookie_secure: self.session_cookie_secure.clone(),
            same_site: self.session_same_site.clone(),
            allow_ephemeral: self.session_allow_ephemeral,
        }
    }

    /// SMTP relay settings, or `None` when mail should only be logged.
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        let host = self
            .smtp_host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())?;
        Some(SmtpSettings {
            host: host.to_owned(),
            port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            starttls: self.smtp_starttls,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone().map(Zeroizing::new),
        })
    }

    /// Sender settings for the confirmation dispatcher.
    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            from: self
                .mail_from
                .clone()
                .unwrap_or_else(|| DispatchSettings::default().from),
            fail_silently: self.mail_fail_silently,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use crate::inbound::http::session_config::{BuildMode, SessionConfigError, session_settings};

    const VARS: [&str; 14] = [
        "EVENTS_BIND_ADDR",
        "EVENTS_DATABASE_URL",
        "EVENTS_POOL_MAX_SIZE",
        "EVENTS_SESSION_KEY_FILE",
        "EVENTS_SESSION_COOKIE_SECURE",
        "EVENTS_SESSION_SAME_SITE",
        "EVENTS_SESSION_ALLOW_EPHEMERAL",
        "EVENTS_SMTP_HOST",
        "EVENTS_SMTP_PORT",
        "EVENTS_SMTP_STARTTLS",
        "EVENTS_SMTP_USERNAME",
        "EVENTS_SMTP_PASSWORD",
        "EVENTS_MAIL_FROM",
        "EVENTS_MAIL_FAIL_SILENTLY",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let vars = VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        });
        let _guard = lock_env(vars);
        AppSettings::load_from_iter([OsString::from("events-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);

        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.smtp_settings().is_none());
        assert_eq!(settings.dispatch_settings(), DispatchSettings::default());
        assert!(!settings.session_allow_ephemeral);
        assert!(settings.smtp_starttls);
        assert!(settings.mail_fail_silently);
        assert!(settings.session_toggles().cookie_secure.is_none());
        assert!(matches!(
            settings.pool_config(),
            Err(SettingsError::MissingDatabaseUrl)
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("EVENTS_BIND_ADDR", "127.0.0.1:9000"),
            ("EVENTS_DATABASE_URL", "postgres://localhost/events"),
            ("EVENTS_SMTP_HOST", "smtp.example.org"),
            ("EVENTS_SMTP_PORT", "2525"),
            ("EVENTS_MAIL_FROM", "events@example.org"),
            ("EVENTS_MAIL_FAIL_SILENTLY", "false"),
        ]);

        assert_eq!(settings.bind_addr().expect("address").port(), 9000);
        assert_eq!(
            settings.pool_config().expect("pool").database_url(),
            "postgres://localhost/events"
        );
        let smtp = settings.smtp_settings().expect("smtp configured");
        assert_eq!(smtp.host, "smtp.example.org");
        assert_eq!(smtp.port, 2525);
        assert!(smtp.starttls);
        let dispatch = settings.dispatch_settings();
        assert_eq!(dispatch.from, "events@example.org");
        assert!(!dispatch.fail_silently);
    }

    #[rstest]
    #[case("localhost")]
    #[case("8080")]
    fn malformed_bind_address_is_reported(#[case] value: &str) {
        let settings = load_with(&[("EVENTS_BIND_ADDR", value)]);

        let err = settings.bind_addr().expect_err("invalid address");

        assert!(err.to_string().contains(value), "{err}");
    }

    #[rstest]
    fn blank_smtp_host_means_logging_only() {
        let settings = load_with(&[("EVENTS_SMTP_HOST", "  ")]);
        assert!(settings.smtp_settings().is_none());
    }

    #[rstest]
    fn unset_mail_toggles_fail_soft_over_starttls() {
        let settings = load_with(&[("EVENTS_SMTP_HOST", "smtp.example.org")]);

        let smtp = settings.smtp_settings().expect("smtp configured");
        assert!(smtp.starttls);
        assert!(settings.dispatch_settings().fail_silently);
    }

    #[rstest]
    fn release_build_without_cookie_secure_is_rejected() {
        let key = tempfile::NamedTempFile::new().expect("temp file");
        std::fs::write(key.path(), [b'k'; 64]).expect("write key");
        let key_path = key.path().to_string_lossy().into_owned();
        let settings = load_with(&[
            ("EVENTS_SESSION_KEY_FILE", key_path.as_str()),
            ("EVENTS_SESSION_SAME_SITE", "Strict"),
        ]);

        let result = session_settings(&settings.session_toggles(), BuildMode::Release);

        assert!(matches!(
            result,
            Err(SessionConfigError::Missing {
                name: "EVENTS_SESSION_COOKIE_SECURE"
            })
        ));
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    fn explicit_cookie_secure_reaches_session_settings(
        #[case] value: &str,
        #[case] expected: bool,
    ) {
        let key = tempfile::NamedTempFile::new().expect("temp file");
        std::fs::write(key.path(), [b'k'; 64]).expect("write key");
        let key_path = key.path().to_string_lossy().into_owned();
        let settings = load_with(&[
            ("EVENTS_SESSION_KEY_FILE", key_path.as_str()),
            ("EVENTS_SESSION_SAME_SITE", "Strict"),
            ("EVENTS_SESSION_COOKIE_SECURE", value),
        ]);

        let session = session_settings(&settings.session_toggles(), BuildMode::Release)
            .expect("explicit toggles");

        assert_eq!(session.cookie_secure, expected);
    }
}
