//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    EventCommand, EventQuery, LoginService, ParticipantsQuery, RegistrationCommand, UserAccounts,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn UserAccounts>,
    pub events: Arc<dyn EventCommand>,
    pub events_query: Arc<dyn EventQuery>,
    pub registrations: Arc<dyn RegistrationCommand>,
    pub participants: Arc<dyn ParticipantsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn UserAccounts>,
    pub events: Arc<dyn EventCommand>,
    pub events_query: Arc<dyn EventQuery>,
    pub registrations: Arc<dyn RegistrationCommand>,
    pub participants: Arc<dyn ParticipantsQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use events_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use events_backend::test_support::InMemoryStore;
    ///
    /// let store = InMemoryStore::new();
    /// let ports: HttpStatePorts = store.http_ports();
    /// let state = HttpState::new(ports);
    /// let _login = Arc::clone(&state.login);
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            events,
            events_query,
            registrations,
            participants,
        } = ports;
        Self {
            login,
            accounts,
            events,
            events_query,
            registrations,
            participants,
        }
    }
}
