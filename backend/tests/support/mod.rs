//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, which
//! makes it awkward to share small helpers without copy/paste. This module
//! builds the production route table over the in-memory store and wraps the
//! request plumbing the HTTP suites share.

use actix_session::config::CookieContentSecurity;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use events_backend::Trace;
use events_backend::inbound::http::events::{
    create_event, delete_event, get_event, list_events, update_event,
};
use events_backend::inbound::http::health::{HealthState, live, ready};
use events_backend::inbound::http::registrations::{list_participants, register, unregister};
use events_backend::inbound::http::state::HttpState;
use events_backend::inbound::http::users::{
    current_user, login, logout, sign_up, update_current_user,
};
use events_backend::test_support::InMemoryStore;
use serde_json::{Value, json};

/// Route table matching the server binary, backed by `store`.
pub fn app(
    store: &InMemoryStore,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .build();
    let health = web::Data::new(HealthState::new());
    health.mark_ready();

    App::new()
        .app_data(health)
        .app_data(web::Data::new(HttpState::new(store.http_ports())))
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .wrap(session)
                .service(sign_up)
                .service(login)
                .service(logout)
                .service(current_user)
                .service(update_current_user)
                .service(list_events)
                .service(create_event)
                .service(get_event)
                .service(update_event)
                .service(delete_event)
                .service(register)
                .service(unregister)
                .service(list_participants),
        )
        .service(ready)
        .service(live)
}

/// Log in through `POST /api/v1/login` and return the session cookie.
pub async fn login_cookie<S>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "username": username, "password": password }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "login as {username} failed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Send a request and decode the JSON body, if any.
pub async fn send<S>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}
