//! Registration confirmations from commit to mailbox.
//!
//! Jobs recorded by the registration service are replayed through the Tokio
//! queue and worker, with the dispatcher reading users and events from the
//! same in-memory store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use events_backend::domain::ports::{NotificationQueue, RegistrationNotifier};
use events_backend::domain::{DispatchSettings, ErrorCode, EventId, ParticipantBatch, User};
use events_backend::outbound::queue::{TokioNotificationQueue, run_notification_worker};
use events_backend::test_support::{InMemoryStore, RecordingMailer};
use rstest::{fixture, rstest};

struct Scene {
    store: InMemoryStore,
    ada: User,
    quiet: User,
    event: EventId,
}

#[fixture]
fn scene() -> Scene {
    let store = InMemoryStore::new();
    let host = store.seed_user("host", None, "secret-pass", false);
    let ada = store.seed_user("ada", Some("ada@example.org"), "secret-pass", false);
    let quiet = store.seed_user("quiet", None, "secret-pass", false);
    let date = Utc
        .with_ymd_and_hms(2026, 6, 1, 18, 30, 0)
        .single()
        .expect("valid date");
    let event = store.seed_event(host.id(), "Rust meetup", date).id();
    Scene {
        store,
        ada,
        quiet,
        event,
    }
}

fn settings(fail_silently: bool) -> DispatchSettings {
    DispatchSettings {
        from: "events@example.org".to_owned(),
        fail_silently,
    }
}

#[rstest]
#[tokio::test]
async fn committed_registrations_reach_the_mailer(scene: Scene) {
    let ports = scene.store.http_ports();
    let batch = ParticipantBatch::new(vec![scene.ada.id().get(), scene.quiet.id().get()])
        .expect("valid batch");
    ports
        .registrations
        .register(scene.event, batch)
        .await
        .expect("registration succeeds");

    let (queue, receiver) = TokioNotificationQueue::channel();
    for job in scene.store.queued_jobs() {
        queue.enqueue(job).await.expect("enqueue");
    }
    drop(queue);

    let mailer = Arc::new(RecordingMailer::default());
    let notifier = Arc::new(scene.store.dispatcher(Arc::clone(&mailer), settings(true)));
    run_notification_worker(receiver, notifier as Arc<dyn RegistrationNotifier>).await;

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1, "users without email are skipped");
    let email = &sent[0];
    assert_eq!(email.to.as_ref(), "ada@example.org");
    assert_eq!(email.from, "events@example.org");
    assert_eq!(email.subject, "Registration confirmed: Rust meetup");
    assert!(email.body.starts_with("Hi ada,"), "{}", email.body);
    assert!(email.body.contains("at Main hall"), "{}", email.body);
    assert!(email.body.contains("Organizer: host"), "{}", email.body);
}

#[rstest]
#[tokio::test]
async fn user_without_email_is_skipped(scene: Scene) {
    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = scene.store.dispatcher(Arc::clone(&mailer), settings(false));

    let sent = dispatcher
        .notify(scene.quiet.id(), scene.event)
        .await
        .expect("skip is not an error");

    assert!(!sent);
    assert!(mailer.sent().is_empty());
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn transport_failures_honour_fail_silently(scene: Scene, #[case] fail_silently: bool) {
    let mailer = Arc::new(RecordingMailer::default());
    mailer.fail_transport();
    let dispatcher = scene
        .store
        .dispatcher(Arc::clone(&mailer), settings(fail_silently));

    let result = dispatcher.notify(scene.ada.id(), scene.event).await;

    if fail_silently {
        assert!(!result.expect("failure is swallowed"));
    } else {
        let error = result.expect_err("failure is surfaced");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}

#[rstest]
#[tokio::test]
async fn deleted_event_is_skipped(scene: Scene) {
    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = scene.store.dispatcher(Arc::clone(&mailer), settings(false));
    let missing = EventId::new(scene.event.get() + 100).expect("event id");

    let sent = dispatcher
        .notify(scene.ada.id(), missing)
        .await
        .expect("skip is not an error");

    assert!(!sent);
    assert!(mailer.sent().is_empty());
}
