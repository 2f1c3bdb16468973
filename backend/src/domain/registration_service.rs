//! Registration reconcilers.
//!
//! Both reconcilers run inside one store transaction:
//!
//! 1. the event must exist (its row stays share-locked until the end);
//! 2. every requested participant must exist, otherwise nothing is written;
//! 3. the minimal write is applied (conflict-ignoring insert or bulk delete);
//! 4. the transaction commits.
//!
//! Confirmation jobs for newly inserted registrations are collected in an
//! [`AfterCommit`] list and only enqueued once the commit has succeeded. A
//! failure at any earlier point discards them and rolls back.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    NotificationQueue, RegistrationCommand, RegistrationStore, RegistrationStoreError,
    RegistrationTransaction,
};
use crate::domain::{
    AfterCommit, Error, EventId, ParticipantBatch, RegistrationNotificationJob,
    RegistrationOutcome, UnregistrationOutcome, UserId,
};

fn map_store_error(error: RegistrationStoreError) -> Error {
    match error {
        RegistrationStoreError::Connection { message } => {
            Error::service_unavailable(format!("registration store unavailable: {message}"))
        }
        RegistrationStoreError::Query { message } => {
            Error::internal(format!("registration store error: {message}"))
        }
    }
}

fn missing_users_error(missing: &[UserId]) -> Error {
    let ids: Vec<i64> = missing.iter().map(|id| id.get()).collect();
    Error::invalid_request(format!("Users not found: {ids:?}")).with_details(json!({
        "field": "participant_ids",
        "missing_ids": ids,
    }))
}

async fn ensure_event(
    tx: &mut dyn RegistrationTransaction,
    event: EventId,
) -> Result<(), Error> {
    if tx.event_exists(event).await.map_err(map_store_error)? {
        Ok(())
    } else {
        Err(Error::not_found(format!("event {event} not found")))
    }
}

async fn ensure_users(
    tx: &mut dyn RegistrationTransaction,
    batch: &ParticipantBatch,
) -> Result<(), Error> {
    let mut missing = tx
        .missing_users(batch.ids())
        .await
        .map_err(map_store_error)?;
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort_unstable();
    Err(missing_users_error(&missing))
}

/// Commit on success and flush deferred work; otherwise discard and roll back.
async fn finish<T>(
    mut tx: Box<dyn RegistrationTransaction>,
    result: Result<T, Error>,
    after_commit: AfterCommit,
) -> Result<T, Error> {
    let value = match result {
        Ok(value) => value,
        Err(error) => {
            let dropped = after_commit.discard();
            roll_back(tx.as_mut(), dropped).await;
            return Err(error);
        }
    };
    if let Err(error) = tx.commit().await {
        let dropped = after_commit.discard();
        warn!(%error, dropped, "registration commit failed");
        roll_back(tx.as_mut(), dropped).await;
        return Err(map_store_error(error));
    }
    after_commit.flush().await;
    Ok(value)
}

async fn roll_back(tx: &mut dyn RegistrationTransaction, dropped: usize) {
    if let Err(error) = tx.rollback().await {
        warn!(%error, "registration rollback failed");
    } else {
        debug!(dropped, "registration transaction rolled back");
    }
}

/// Registration service implementing [`RegistrationCommand`].
#[derive(Clone)]
pub struct RegistrationService<S, Q> {
    store: Arc<S>,
    queue: Arc<Q>,
    clock: Arc<dyn Clock>,
}

impl<S, Q> RegistrationService<S, Q> {
    /// Create a new service.
    pub fn new(store: Arc<S>, queue: Arc<Q>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            queue,
            clock,
        }
    }
}

impl<S, Q> RegistrationService<S, Q>
where
    S: RegistrationStore,
    Q: NotificationQueue + 'static,
{
    async fn reconcile_registration(
        &self,
        tx: &mut dyn RegistrationTransaction,
        event: EventId,
        batch: &ParticipantBatch,
        after_commit: &mut AfterCommit,
    ) -> Result<RegistrationOutcome, Error> {
        ensure_event(tx, event).await?;
        ensure_users(tx, batch).await?;

        let mut already = tx
            .registered_participants(event, batch.ids())
            .await
            .map_err(map_store_error)?;
        already.sort_unstable();
        let to_create = batch.excluding(&already);

        if !to_create.is_empty() {
            let inserted = tx
                .insert_registrations(event, &to_create, self.clock.utc())
                .await
                .map_err(map_store_error)?;
            for user in inserted {
                self.defer_notification(after_commit, user, event);
            }
        }

        Ok(RegistrationOutcome::new(event, to_create, already))
    }

    fn defer_notification(&self, after_commit: &mut AfterCommit, user: UserId, event: EventId) {
        let queue = Arc::clone(&self.queue);
        let job = RegistrationNotificationJob::new(user, event);
        after_commit.defer(move || {
            Box::pin(async move {
                if let Err(error) = queue.enqueue(job).await {
                    warn!(%error, user_id = %user, event_id = %event, "notification enqueue failed");
                }
            })
        });
    }
}

#[async_trait]
impl<S, Q> RegistrationCommand for RegistrationService<S, Q>
where
    S: RegistrationStore,
    Q: NotificationQueue + 'static,
{
    async fn register(
        &self,
        event: EventId,
        batch: ParticipantBatch,
    ) -> Result<RegistrationOutcome, Error> {
        let mut tx = self.store.begin().await.map_err(map_store_error)?;
        let mut after_commit = AfterCommit::default();
        let result = self
            .reconcile_registration(tx.as_mut(), event, &batch, &mut after_commit)
            .await;
        let outcome = finish(tx, result, after_commit).await?;
        info!(
            event_id = %event,
            created = outcome.created_count,
            already = outcome.already_registered_ids.len(),
            "registration reconciled"
        );
        Ok(outcome)
    }

    async fn unregister(
        &self,
        event: EventId,
        batch: ParticipantBatch,
    ) -> Result<UnregistrationOutcome, Error> {
        let mut tx = self.store.begin().await.map_err(map_store_error)?;
        let result = async {
            ensure_event(tx.as_mut(), event).await?;
            ensure_users(tx.as_mut(), &batch).await?;
            let deleted = tx
                .delete_registrations(event, batch.ids())
                .await
                .map_err(map_store_error)?;
            Ok::<_, Error>(UnregistrationOutcome::new(event, &batch, deleted))
        }
        .await;
        let outcome = finish(tx, result, AfterCommit::default()).await?;
        info!(
            event_id = %event,
            deleted = outcome.deleted_count,
            not_found = outcome.not_found_ids.len(),
            "unregistration reconciled"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "registration_service_tests.rs"]
mod tests;
