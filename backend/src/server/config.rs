//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use events_backend::domain::DispatchSettings;
use events_backend::outbound::mail::SmtpSettings;
use events_backend::outbound::persistence::DbPool;
use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) smtp: Option<SmtpSettings>,
    pub(crate) dispatch: DispatchSettings,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    ///
    /// Confirmation mail is logged rather than sent until
    /// [`Self::with_mail`] supplies a relay.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        db_pool: DbPool,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool,
            smtp: None,
            dispatch: DispatchSettings::default(),
        }
    }

    /// Configure confirmation mail delivery.
    #[must_use]
    pub fn with_mail(mut self, smtp: Option<SmtpSettings>, dispatch: DispatchSettings) -> Self {
        self.smtp = smtp;
        self.dispatch = dispatch;
        self
    }
}
