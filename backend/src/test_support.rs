//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for tests and when the
//! `test-support` feature is enabled.
//!
//! [`InMemoryStore`] implements the user, event, and registration ports over
//! shared maps. Registration transactions buffer their writes until commit,
//! and [`InMemoryStore::fail_next_commit`] injects a commit failure after the
//! write so post-commit behaviour can be observed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::{Clock, DefaultClock};
use pagination::PageParams;

use crate::domain::ports::{
    EventCommand, EventRepository, EventRepositoryError, JobDispatchError, LoginService, Mailer,
    MailerError, NewEventRecord, NewUserRecord, NotificationQueue, RegistrationStore, RegistrationStoreError,
    RegistrationTransaction, StoredCredentials, UserChanges, UserPersistenceError, UserRepository,
};
use crate::domain::{
    DispatchSettings, EmailAddress, Event, EventChanges, EventDraft, EventFilter, EventId,
    EventParts, EventService, Listing, NotificationDispatcher, OutgoingEmail, ParticipantsService,
    PasswordDigest, RegistrationNotificationJob, RegistrationService, User, UserAccountService,
    UserId, UserSummary, Username,
};
use crate::inbound::http::state::HttpStatePorts;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Queue double that keeps every accepted job.
#[derive(Debug, Default)]
pub struct RecordingNotificationQueue {
    jobs: Mutex<Vec<RegistrationNotificationJob>>,
}

impl RecordingNotificationQueue {
    /// Jobs accepted so far, in enqueue order.
    pub fn jobs(&self) -> Vec<RegistrationNotificationJob> {
        lock(&self.jobs).clone()
    }
}

#[async_trait]
impl NotificationQueue for RecordingNotificationQueue {
    async fn enqueue(&self, job: RegistrationNotificationJob) -> Result<(), JobDispatchError> {
        lock(&self.jobs).push(job);
        Ok(())
    }
}

/// Mailer double that records messages and can simulate transport failure.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    /// Make every following send fail with a transport error.
    pub fn fail_transport(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Messages delivered so far.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailerError::transport("simulated relay outage"));
        }
        lock(&self.sent).push(email.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    digest: PasswordDigest,
}

type RegistrationKey = (EventId, UserId);

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<UserId, StoredUser>,
    events: BTreeMap<EventId, Event>,
    registrations: BTreeSet<RegistrationKey>,
    last_user_id: i64,
    last_event_id: i64,
    fail_next_commit: bool,
}

impl StoreState {
    fn summary(&self, id: UserId) -> Option<UserSummary> {
        self.users.get(&id).map(|stored| UserSummary::from(&stored.user))
    }
}

/// Shared in-memory implementation of the persistence ports.
///
/// Clones share state, so one store can back every service of an app while
/// the test keeps a handle for seeding and assertions.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    queue: Arc<RecordingNotificationQueue>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Create an empty store whose services read `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            queue: Arc::new(RecordingNotificationQueue::default()),
            clock,
        }
    }

    /// Make the next registration commit fail after its writes were issued.
    pub fn fail_next_commit(&self) {
        lock(&self.state).fail_next_commit = true;
    }

    /// Notification jobs enqueued by services built with [`Self::http_ports`].
    pub fn queued_jobs(&self) -> Vec<RegistrationNotificationJob> {
        self.queue.jobs()
    }

    /// Committed participants of `event`, ascending.
    pub fn registrations_for(&self, event: EventId) -> Vec<UserId> {
        lock(&self.state)
            .registrations
            .iter()
            .filter(|(registered_event, _)| *registered_event == event)
            .map(|(_, user)| *user)
            .collect()
    }

    /// Insert an account directly, bypassing the services.
    ///
    /// # Panics
    ///
    /// Panics when the username or email is invalid; seed data is trusted.
    pub fn seed_user(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
        is_staff: bool,
    ) -> User {
        let username = match Username::new(username) {
            Ok(username) => username,
            Err(error) => panic!("invalid seed username {username:?}: {error}"),
        };
        let email = email.map(|raw| match EmailAddress::new(raw) {
            Ok(email) => email,
            Err(error) => panic!("invalid seed email {raw:?}: {error}"),
        });
        let digest = match PasswordDigest::derive(password) {
            Ok(digest) => digest,
            Err(error) => panic!("seed password rejected: {error}"),
        };
        match insert_user(&mut lock(&self.state), username, email, digest, is_staff) {
            Ok(user) => user,
            Err(error) => panic!("seed user rejected: {error}"),
        }
    }

    /// Insert an event directly, bypassing the services.
    ///
    /// # Panics
    ///
    /// Panics when the organiser is unknown or the fields are invalid.
    pub fn seed_event(&self, organizer: UserId, title: &str, date: DateTime<Utc>) -> Event {
        let draft = match EventDraft::new(title, "", date, "Main hall") {
            Ok(draft) => draft,
            Err(error) => panic!("invalid seed event: {error}"),
        };
        let record = NewEventRecord {
            draft,
            organizer,
            created_at: self.clock.utc(),
        };
        match insert_event(&mut lock(&self.state), &record) {
            Ok(event) => event,
            Err(error) => panic!("seed event rejected: {error}"),
        }
    }

    /// Driving ports wired to services backed by this store.
    pub fn http_ports(&self) -> HttpStatePorts {
        let store = Arc::new(self.clone());
        let accounts = Arc::new(UserAccountService::new(Arc::clone(&store)));
        let events = Arc::new(EventService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&self.clock),
        ));
        let registrations = Arc::new(RegistrationService::new(
            Arc::clone(&store),
            Arc::clone(&self.queue),
            Arc::clone(&self.clock),
        ));
        let participants = Arc::new(ParticipantsService::new(Arc::clone(&store), store));
        HttpStatePorts {
            login: Arc::clone(&accounts) as Arc<dyn LoginService>,
            accounts,
            events: Arc::clone(&events) as Arc<dyn EventCommand>,
            events_query: events,
            registrations,
            participants,
        }
    }

    /// Confirmation dispatcher reading from this store.
    pub fn dispatcher<M>(
        &self,
        mailer: Arc<M>,
        settings: DispatchSettings,
    ) -> NotificationDispatcher<Self, Self, M> {
        let store = Arc::new(self.clone());
        NotificationDispatcher::new(Arc::clone(&store), store, mailer, settings)
    }
}

fn insert_user(
    state: &mut StoreState,
    username: Username,
    email: Option<EmailAddress>,
    digest: PasswordDigest,
    is_staff: bool,
) -> Result<User, UserPersistenceError> {
    if state
        .users
        .values()
        .any(|stored| stored.user.username() == &username)
    {
        return Err(UserPersistenceError::conflict(format!(
            "users_username_key ({username})"
        )));
    }
    let id = UserId::new(state.last_user_id + 1)
        .map_err(|error| UserPersistenceError::query(error.to_string()))?;
    state.last_user_id += 1;
    let user = User::new(id, username, email, is_staff);
    state.users.insert(
        id,
        StoredUser {
            user: user.clone(),
            digest,
        },
    );
    Ok(user)
}

fn update_user(
    state: &mut StoreState,
    id: UserId,
    changes: &UserChanges,
) -> Result<Option<User>, UserPersistenceError> {
    if let Some(username) = &changes.username {
        let held_elsewhere = state
            .users
            .iter()
            .any(|(other, stored)| *other != id && stored.user.username() == username);
        if held_elsewhere {
            return Err(UserPersistenceError::conflict(format!(
                "users_username_key ({username})"
            )));
        }
    }
    let Some(stored) = state.users.get_mut(&id) else {
        return Ok(None);
    };
    let current = &stored.user;
    stored.user = User::new(
        id,
        changes
            .username
            .clone()
            .unwrap_or_else(|| current.username().clone()),
        changes
            .email
            .clone()
            .unwrap_or_else(|| current.email().cloned()),
        current.is_staff(),
    );
    if let Some(digest) = &changes.password_digest {
        stored.digest = digest.clone();
    }
    let user = stored.user.clone();
    if changes.username.is_some() {
        rename_organizer(state, &user)?;
    }
    Ok(Some(user))
}

fn rename_organizer(state: &mut StoreState, user: &User) -> Result<(), UserPersistenceError> {
    let summary = UserSummary::from(user);
    for event in state.events.values_mut() {
        if event.organizer().id != user.id() {
            continue;
        }
        *event = Event::new(EventParts {
            id: event.id(),
            title: event.title().to_owned(),
            description: event.description().to_owned(),
            date: event.date(),
            location: event.location().to_owned(),
            organizer: summary.clone(),
            created_at: event.created_at(),
            updated_at: event.updated_at(),
        })
        .map_err(|error| UserPersistenceError::query(error.to_string()))?;
    }
    Ok(())
}

fn insert_event(
    state: &mut StoreState,
    record: &NewEventRecord,
) -> Result<Event, EventRepositoryError> {
    let organizer = state
        .summary(record.organizer)
        .ok_or_else(|| EventRepositoryError::query("organizer does not exist"))?;
    let id = EventId::new(state.last_event_id + 1)
        .map_err(|error| EventRepositoryError::query(error.to_string()))?;
    let draft = &record.draft;
    let event = Event::new(EventParts {
        id,
        title: draft.title().to_owned(),
        description: draft.description().to_owned(),
        date: draft.date(),
        location: draft.location().to_owned(),
        organizer,
        created_at: record.created_at,
        updated_at: record.created_at,
    })
    .map_err(|error| EventRepositoryError::query(error.to_string()))?;
    state.last_event_id += 1;
    state.events.insert(id, event.clone());
    Ok(event)
}

fn apply_changes(
    event: &Event,
    changes: &EventChanges,
    updated_at: DateTime<Utc>,
) -> Result<Event, EventRepositoryError> {
    Event::new(EventParts {
        id: event.id(),
        title: changes.title().unwrap_or(event.title()).to_owned(),
        description: changes
            .description()
            .unwrap_or(event.description())
            .to_owned(),
        date: changes.date().unwrap_or(event.date()),
        location: changes.location().unwrap_or(event.location()).to_owned(),
        organizer: event.organizer().clone(),
        created_at: event.created_at(),
        updated_at,
    })
    .map_err(|error| EventRepositoryError::query(error.to_string()))
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        insert_user(
            &mut lock(&self.state),
            record.username.clone(),
            record.email.clone(),
            record.password_digest.clone(),
            false,
        )
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.state)
            .users
            .get(&id)
            .map(|stored| stored.user.clone()))
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        update_user(&mut lock(&self.state), id, changes)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(lock(&self.state)
            .users
            .values()
            .find(|stored| stored.user.username().as_ref() == username)
            .map(|stored| StoredCredentials {
                user: stored.user.clone(),
                password_digest: stored.digest.clone(),
            }))
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn create(&self, record: &NewEventRecord) -> Result<Event, EventRepositoryError> {
        insert_event(&mut lock(&self.state), record)
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, EventRepositoryError> {
        Ok(lock(&self.state).events.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &EventFilter,
        page: PageParams,
    ) -> Result<Listing<Event>, EventRepositoryError> {
        let mut matching: Vec<Event> = lock(&self.state)
            .events
            .values()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.date()
                .cmp(&b.date())
                .then_with(|| a.title().cmp(b.title()))
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(Listing::from_ordered(matching, &page))
    }

    async fn update(
        &self,
        id: EventId,
        changes: &EventChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Event>, EventRepositoryError> {
        let mut state = lock(&self.state);
        let Some(current) = state.events.get(&id) else {
            return Ok(None);
        };
        let updated = apply_changes(current, changes, updated_at)?;
        state.events.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: EventId) -> Result<bool, EventRepositoryError> {
        let mut state = lock(&self.state);
        let removed = state.events.remove(&id).is_some();
        state.registrations.retain(|(event, _)| *event != id);
        Ok(removed)
    }
}

#[async_trait]
impl RegistrationStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn RegistrationTransaction>, RegistrationStoreError> {
        Ok(Box::new(InMemoryTransaction {
            state: Arc::clone(&self.state),
            pending: Vec::new(),
            open: true,
        }))
    }

    async fn participants(
        &self,
        event: EventId,
        page: PageParams,
    ) -> Result<Listing<UserSummary>, RegistrationStoreError> {
        let state = lock(&self.state);
        let participants: Vec<UserSummary> = state
            .registrations
            .iter()
            .filter(|(registered_event, _)| *registered_event == event)
            .filter_map(|(_, user)| state.summary(*user))
            .collect();
        Ok(Listing::from_ordered(participants, &page))
    }
}

/// Transaction over [`InMemoryStore`] that applies its writes on commit.
pub struct InMemoryTransaction {
    state: Arc<Mutex<StoreState>>,
    pending: Vec<(RegistrationKey, bool)>,
    open: bool,
}

impl InMemoryTransaction {
    fn ensure_open(&self) -> Result<(), RegistrationStoreError> {
        if self.open {
            Ok(())
        } else {
            Err(RegistrationStoreError::query("transaction already finished"))
        }
    }

    fn is_registered(&self, state: &StoreState, key: RegistrationKey) -> bool {
        self.pending
            .iter()
            .rev()
            .find(|(pending_key, _)| *pending_key == key)
            .map_or_else(|| state.registrations.contains(&key), |(_, present)| *present)
    }
}

#[async_trait]
impl RegistrationTransaction for InMemoryTransaction {
    async fn event_exists(&mut self, event: EventId) -> Result<bool, RegistrationStoreError> {
        self.ensure_open()?;
        Ok(lock(&self.state).events.contains_key(&event))
    }

    async fn missing_users(
        &mut self,
        ids: &[UserId],
    ) -> Result<Vec<UserId>, RegistrationStoreError> {
        self.ensure_open()?;
        let state = lock(&self.state);
        let missing: BTreeSet<UserId> = ids
            .iter()
            .copied()
            .filter(|id| !state.users.contains_key(id))
            .collect();
        Ok(missing.into_iter().collect())
    }

    async fn registered_participants(
        &mut self,
        event: EventId,
        ids: &[UserId],
    ) -> Result<Vec<UserId>, RegistrationStoreError> {
        self.ensure_open()?;
        let state = lock(&self.state);
        let registered: BTreeSet<UserId> = ids
            .iter()
            .copied()
            .filter(|user| self.is_registered(&state, (event, *user)))
            .collect();
        Ok(registered.into_iter().collect())
    }

    async fn insert_registrations(
        &mut self,
        event: EventId,
        ids: &[UserId],
        _registered_at: DateTime<Utc>,
    ) -> Result<Vec<UserId>, RegistrationStoreError> {
        self.ensure_open()?;
        let state = Arc::clone(&self.state);
        let guard = lock(&state);
        let mut inserted = BTreeSet::new();
        for user in ids {
            let key = (event, *user);
            if !self.is_registered(&guard, key) {
                self.pending.push((key, true));
                inserted.insert(*user);
            }
        }
        Ok(inserted.into_iter().collect())
    }

    async fn delete_registrations(
        &mut self,
        event: EventId,
        ids: &[UserId],
    ) -> Result<Vec<UserId>, RegistrationStoreError> {
        self.ensure_open()?;
        let state = Arc::clone(&self.state);
        let guard = lock(&state);
        let mut deleted = BTreeSet::new();
        for user in ids {
            let key = (event, *user);
            if self.is_registered(&guard, key) {
                self.pending.push((key, false));
                deleted.insert(*user);
            }
        }
        Ok(deleted.into_iter().collect())
    }

    async fn commit(&mut self) -> Result<(), RegistrationStoreError> {
        self.ensure_open()?;
        let mut state = lock(&self.state);
        if std::mem::take(&mut state.fail_next_commit) {
            return Err(RegistrationStoreError::connection("injected commit failure"));
        }
        for (key, present) in self.pending.drain(..) {
            if present {
                state.registrations.insert(key);
            } else {
                state.registrations.remove(&key);
            }
        }
        self.open = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), RegistrationStoreError> {
        self.ensure_open()?;
        self.pending.clear();
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Behaviour of the in-memory doubles themselves.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryStore {
        InMemoryStore::new()
    }

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 18, 30, 0)
            .single()
            .expect("valid date")
    }

    #[rstest]
    #[tokio::test]
    async fn uncommitted_writes_are_invisible_until_commit(store: InMemoryStore) {
        let host = store.seed_user("host", None, "secret", false);
        let event = store.seed_event(host.id(), "Rust meetup", date());

        let mut tx = store.begin().await.expect("begin");
        let inserted = tx
            .insert_registrations(event.id(), &[host.id()], date())
            .await
            .expect("insert");
        assert_eq!(inserted, vec![host.id()]);
        assert!(store.registrations_for(event.id()).is_empty());
        assert_eq!(
            tx.registered_participants(event.id(), &[host.id()])
                .await
                .expect("read own write"),
            vec![host.id()]
        );

        tx.commit().await.expect("commit");
        assert_eq!(store.registrations_for(event.id()), vec![host.id()]);
    }

    #[rstest]
    #[tokio::test]
    async fn injected_commit_failure_discards_writes(store: InMemoryStore) {
        let host = store.seed_user("host", None, "secret", false);
        let event = store.seed_event(host.id(), "Rust meetup", date());
        store.fail_next_commit();

        let mut tx = store.begin().await.expect("begin");
        tx.insert_registrations(event.id(), &[host.id()], date())
            .await
            .expect("insert");
        tx.commit().await.expect_err("injected failure");
        tx.rollback().await.expect("rollback after failed commit");

        assert!(store.registrations_for(event.id()).is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_an_event_cascades_registrations(store: InMemoryStore) {
        let host = store.seed_user("host", None, "secret", false);
        let event = store.seed_event(host.id(), "Rust meetup", date());
        let mut tx = store.begin().await.expect("begin");
        tx.insert_registrations(event.id(), &[host.id()], date())
            .await
            .expect("insert");
        tx.commit().await.expect("commit");

        assert!(EventRepository::delete(&store, event.id()).await.expect("delete"));

        assert!(store.registrations_for(event.id()).is_empty());
    }

    #[rstest]
    fn seeded_staff_users_keep_the_flag(store: InMemoryStore) {
        let admin = store.seed_user("admin", Some("admin@example.org"), "secret", true);
        assert!(admin.is_staff());
    }

    #[rstest]
    #[tokio::test]
    async fn recording_mailer_can_fail() {
        let mailer = RecordingMailer::default();
        mailer.fail_transport();
        let email = OutgoingEmail {
            from: "noreply@localhost".to_owned(),
            to: EmailAddress::new("ada@example.org").expect("email"),
            subject: "s".to_owned(),
            body: "b".to_owned(),
        };

        let err = mailer.send(&email).await.expect_err("failing transport");

        assert!(matches!(err, MailerError::Transport { .. }));
        assert!(mailer.sent().is_empty());
    }
}
