//! Tests for registration handlers.

use super::*;
use crate::domain::{EventId, Listing, RegistrationOutcome, UserId, Username};
use crate::inbound::http::test_utils::{
    MockPorts, TEST_LOGIN_PATH, login_as, session_cookie, test_session_middleware,
};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};

fn test_app(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(ports.into_state())
        .wrap(test_session_middleware())
        .route(TEST_LOGIN_PATH, web::post().to(login_as))
        .service(
            web::scope("/api/v1")
                .service(register)
                .service(unregister)
                .service(list_participants),
        )
}

async fn read_json(response: actix_web::dev::ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("response JSON")
}

fn uids(raw: &[i64]) -> Vec<UserId> {
    raw.iter()
        .map(|value| UserId::new(*value).expect("user id"))
        .collect()
}

fn eid(value: i64) -> EventId {
    EventId::new(value).expect("event id")
}

#[rstest]
#[case(&[1, 2], &[], StatusCode::CREATED)]
#[case(&[], &[1, 2], StatusCode::OK)]
#[actix_web::test]
async fn register_status_reflects_outcome(
    #[case] created: &'static [i64],
    #[case] already: &'static [i64],
    #[case] expected: StatusCode,
) {
    let mut ports = MockPorts::default();
    ports
        .registrations
        .expect_register()
        .withf(|event, batch| event.get() == 3 && batch.ids() == uids(&[1, 2]).as_slice())
        .times(1)
        .return_once(move |event, _| Ok(RegistrationOutcome::new(event, uids(created), uids(already))));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = session_cookie(&app, "/test-login/1").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/events/3/register")
            .cookie(cookie)
            .set_json(json!({"participant_ids": [1, 2, 1]}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
    let value = read_json(response).await;
    assert_eq!(value["event_id"], 3);
    assert_eq!(value["created_ids"], json!(created));
    assert_eq!(value["already_registered_ids"], json!(already));
    assert_eq!(value["created_count"], created.len());
}

#[rstest]
#[case(json!({"participant_ids": []}), "empty_batch")]
#[case(json!({"participant_ids": [4, -1]}), "invalid_id")]
#[actix_web::test]
async fn register_rejects_invalid_batches(#[case] body: Value, #[case] code: &str) {
    let mut ports = MockPorts::default();
    ports.registrations.expect_register().times(0);
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = session_cookie(&app, "/test-login/1").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/events/3/register")
            .cookie(cookie)
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = read_json(response).await;
    assert_eq!(value["details"]["field"], "participant_ids");
    assert_eq!(value["details"]["code"], code);
}

#[actix_web::test]
async fn register_surfaces_missing_users() {
    let mut ports = MockPorts::default();
    ports.registrations.expect_register().times(1).return_once(|_, _| {
        Err(Error::invalid_request("Users not found: [7, 9]")
            .with_details(json!({"field": "participant_ids", "missing_ids": [7, 9]})))
    });
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = session_cookie(&app, "/test-login/1").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/events/3/register")
            .cookie(cookie)
            .set_json(json!({"participant_ids": [1, 7, 9]}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = read_json(response).await;
    assert_eq!(value["message"], "Users not found: [7, 9]");
    assert_eq!(value["details"]["missing_ids"], json!([7, 9]));
}

#[actix_web::test]
async fn register_requires_session() {
    let mut ports = MockPorts::default();
    ports.registrations.expect_register().times(0);
    let app = actix_test::init_service(test_app(ports)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/events/3/register")
            .set_json(json!({"participant_ids": [1]}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unregister_reports_partitions() {
    let mut ports = MockPorts::default();
    ports
        .registrations
        .expect_unregister()
        .times(1)
        .return_once(|event, batch| Ok(UnregistrationOutcome::new(event, &batch, uids(&[1]))));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = session_cookie(&app, "/test-login/1").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/events/3/unregister")
            .cookie(cookie)
            .set_json(json!({"participant_ids": [4, 1]}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let value = read_json(response).await;
    assert_eq!(value["deleted_ids"], json!([1]));
    assert_eq!(value["not_found_ids"], json!([4]));
    assert_eq!(value["deleted_count"], 1);
}

#[actix_web::test]
async fn participants_are_public_and_paginated() {
    let mut ports = MockPorts::default();
    ports
        .participants
        .expect_list_participants()
        .withf(|event, page| *event == eid(3) && page.limit() == 20)
        .times(1)
        .return_once(|_, _| {
            Ok(Listing {
                items: vec![UserSummary {
                    id: UserId::new(2).expect("user id"),
                    username: Username::new("grace").expect("username"),
                }],
                total: 1,
            })
        });
    let app = actix_test::init_service(test_app(ports)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/events/3/participants")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let value = read_json(response).await;
    assert_eq!(value["count"], 1);
    assert_eq!(value["next"], Value::Null);
    assert_eq!(value["results"], json!([{"id": 2, "username": "grace"}]));
}

#[actix_web::test]
async fn participants_of_missing_event_is_not_found() {
    let mut ports = MockPorts::default();
    ports
        .participants
        .expect_list_participants()
        .times(1)
        .return_once(|event, _| Err(Error::not_found(format!("event {event} not found"))));
    let app = actix_test::init_service(test_app(ports)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/events/8/participants")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
