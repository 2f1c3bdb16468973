//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test as actix_test, web};
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::{
    MockEventCommand, MockEventQuery, MockLoginService, MockParticipantsQuery,
    MockRegistrationCommand, MockUserAccounts,
};
use crate::domain::{Error, Event, EventId, EventParts, User, UserId, UserSummary, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Path of [`login_as`] when mounted by test apps.
pub const TEST_LOGIN_PATH: &str = "/test-login/{id}";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Persist the user id from the path in the session, bypassing credentials.
pub async fn login_as(session: SessionContext, path: web::Path<i64>) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Call `uri` (a route that persists a session) and return the session cookie.
pub async fn session_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    uri: &str,
) -> Cookie<'static> {
    let res = actix_test::call_service(app, actix_test::TestRequest::post().uri(uri).to_request())
        .await;
    assert!(res.status().is_success(), "session route failed: {}", res.status());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

pub fn fixture_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 18, 30, 0)
        .single()
        .expect("fixture date")
}

pub fn fixture_user(id: i64, username: &str) -> User {
    User::new(
        UserId::new(id).expect("user id"),
        Username::new(username).expect("username"),
        None,
        false,
    )
}

pub fn fixture_event(id: i64, organizer: i64) -> Event {
    Event::new(EventParts {
        id: EventId::new(id).expect("event id"),
        title: "Rust meetup".to_owned(),
        description: "Talks and pizza".to_owned(),
        date: fixture_date(),
        location: "Hall A".to_owned(),
        organizer: UserSummary {
            id: UserId::new(organizer).expect("organizer id"),
            username: Username::new("host").expect("username"),
        },
        created_at: fixture_date(),
        updated_at: fixture_date(),
    })
    .expect("fixture event")
}

/// Mocked driving ports; set expectations, then convert into [`HttpState`].
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub accounts: MockUserAccounts,
    pub events: MockEventCommand,
    pub events_query: MockEventQuery,
    pub registrations: MockRegistrationCommand,
    pub participants: MockParticipantsQuery,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            accounts: Arc::new(self.accounts),
            events: Arc::new(self.events),
            events_query: Arc::new(self.events_query),
            registrations: Arc::new(self.registrations),
            participants: Arc::new(self.participants),
        }))
    }
}
