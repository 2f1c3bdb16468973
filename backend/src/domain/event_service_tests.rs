//! Tests for the event service.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockEventRepository, MockUserRepository};
use crate::domain::{ErrorCode, EventParts, User, UserSummary, Username};

const ORGANIZER: i64 = 1;
const STRANGER: i64 = 2;
const STAFF: i64 = 3;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn uid(value: i64) -> UserId {
    UserId::new(value).expect("user id")
}

fn eid(value: i64) -> EventId {
    EventId::new(value).expect("event id")
}

fn user(id: i64, is_staff: bool) -> User {
    User::new(
        uid(id),
        Username::new(format!("user{id}")).expect("username"),
        None,
        is_staff,
    )
}

fn event(id: i64, title: &str) -> Event {
    Event::new(EventParts {
        id: eid(id),
        title: title.to_owned(),
        description: String::new(),
        date: now(),
        location: "Hall".to_owned(),
        organizer: UserSummary {
            id: uid(ORGANIZER),
            username: Username::new("user1").expect("username"),
        },
        created_at: now(),
        updated_at: now(),
    })
    .expect("valid event")
}

#[fixture]
fn clock() -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now());
    Arc::new(clock)
}

fn service(
    events: MockEventRepository,
    users: MockUserRepository,
    clock: Arc<dyn Clock>,
) -> EventService<MockEventRepository, MockUserRepository> {
    EventService::new(Arc::new(events), Arc::new(users), clock)
}

#[rstest]
#[tokio::test]
async fn create_assigns_caller_as_organizer(clock: Arc<dyn Clock>) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(user(ORGANIZER, false))));
    let mut events = MockEventRepository::new();
    events
        .expect_create()
        .withf(|record| record.organizer == uid(ORGANIZER) && record.created_at == now())
        .times(1)
        .return_once(|_| Ok(event(10, "Launch")));

    let draft = EventDraft::new("Launch", "", now(), "Hall").expect("draft");
    let created = service(events, users, clock)
        .create(uid(ORGANIZER), draft)
        .await
        .expect("create succeeds");

    assert_eq!(created.id(), eid(10));
}

#[rstest]
#[tokio::test]
async fn get_maps_missing_event_to_not_found(clock: Arc<dyn Clock>) {
    let mut events = MockEventRepository::new();
    events.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let err = service(events, MockUserRepository::new(), clock)
        .get(eid(404))
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_by_stranger_is_forbidden_without_write(clock: Arc<dyn Clock>) {
    let mut events = MockEventRepository::new();
    events
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(event(10, "Launch"))));
    events.expect_update().times(0);
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(user(STRANGER, false))));

    let changes = EventChanges::new(Some("Hijacked".to_owned()), None, None, None)
        .expect("changes");
    let err = service(events, users, clock)
        .update(uid(STRANGER), eid(10), changes)
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(ORGANIZER, false)]
#[case(STAFF, true)]
#[tokio::test]
async fn update_allowed_for_organizer_and_staff(
    clock: Arc<dyn Clock>,
    #[case] caller: i64,
    #[case] is_staff: bool,
) {
    let mut events = MockEventRepository::new();
    events
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(event(10, "Launch"))));
    events
        .expect_update()
        .withf(|id, changes, at| *id == eid(10) && changes.title() == Some("Relaunch") && *at == now())
        .times(1)
        .return_once(|_, _, _| Ok(Some(event(10, "Relaunch"))));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(usize::from(caller != ORGANIZER))
        .returning(move |id| Ok(Some(user(id.get(), is_staff))));

    let changes = EventChanges::new(Some("Relaunch".to_owned()), None, None, None)
        .expect("changes");
    let updated = service(events, users, clock)
        .update(uid(caller), eid(10), changes)
        .await
        .expect("update succeeds");

    assert_eq!(updated.title(), "Relaunch");
}

#[rstest]
#[tokio::test]
async fn delete_by_organizer_removes_event(clock: Arc<dyn Clock>) {
    let mut events = MockEventRepository::new();
    events
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(event(10, "Launch"))));
    events.expect_delete().times(1).return_once(|_| Ok(true));

    service(events, MockUserRepository::new(), clock)
        .delete(uid(ORGANIZER), eid(10))
        .await
        .expect("delete succeeds");
}

#[rstest]
#[tokio::test]
async fn list_maps_connection_failures(clock: Arc<dyn Clock>) {
    let mut events = MockEventRepository::new();
    events
        .expect_list()
        .times(1)
        .return_once(|_, _| Err(EventRepositoryError::connection("pool exhausted")));

    let err = service(events, MockUserRepository::new(), clock)
        .list(EventFilter::default(), PageParams::default())
        .await
        .expect_err("unavailable");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
