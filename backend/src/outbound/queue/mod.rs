//! In-process notification queue backed by a Tokio channel.
//!
//! [`TokioNotificationQueue`] implements the `NotificationQueue` port by
//! pushing jobs onto an unbounded channel. A single worker task spawned with
//! [`spawn_notification_worker`] drains the channel and hands each job to a
//! `RegistrationNotifier`, restoring the trace id of the request that
//! scheduled it.
//!
//! Delivery is fire-and-forget: jobs still queued at shutdown are lost and
//! failures are logged, never retried.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::ports::{JobDispatchError, NotificationQueue, RegistrationNotifier};
use crate::domain::{RegistrationNotificationJob, TraceId};

/// Receiving half handed to the worker.
pub type NotificationReceiver = mpsc::UnboundedReceiver<RegistrationNotificationJob>;

/// Queue adapter that sends jobs to the in-process worker.
#[derive(Debug, Clone)]
pub struct TokioNotificationQueue {
    sender: mpsc::UnboundedSender<RegistrationNotificationJob>,
}

impl TokioNotificationQueue {
    /// Create a queue and the receiver its worker will drain.
    pub fn channel() -> (Self, NotificationReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationQueue for TokioNotificationQueue {
    async fn enqueue(&self, job: RegistrationNotificationJob) -> Result<(), JobDispatchError> {
        let user_id = job.user_id;
        let event_id = job.event_id;
        self.sender
            .send(job)
            .map_err(|_| JobDispatchError::unavailable("notification worker has stopped"))?;
        debug!(%user_id, %event_id, "notification job queued");
        Ok(())
    }
}

/// Drain `receiver` until every sender is dropped.
pub async fn run_notification_worker(
    mut receiver: NotificationReceiver,
    notifier: Arc<dyn RegistrationNotifier>,
) {
    info!("notification worker started");
    while let Some(job) = receiver.recv().await {
        let RegistrationNotificationJob {
            user_id,
            event_id,
            trace_id,
        } = job;
        TraceId::scope_optional(trace_id, async {
            match notifier.notify(user_id, event_id).await {
                Ok(sent) => debug!(%user_id, %event_id, sent, "notification job finished"),
                Err(error) => warn!(%error, %user_id, %event_id, "notification job failed"),
            }
        })
        .await;
    }
    info!("notification worker stopped");
}

/// Spawn [`run_notification_worker`] on the current Tokio runtime.
pub fn spawn_notification_worker(
    receiver: NotificationReceiver,
    notifier: Arc<dyn RegistrationNotifier>,
) -> JoinHandle<()> {
    tokio::spawn(run_notification_worker(receiver, notifier))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::ports::MockRegistrationNotifier;
    use crate::domain::{Error, EventId, UserId};
    use rstest::rstest;

    fn job(user: i64, event: i64) -> RegistrationNotificationJob {
        RegistrationNotificationJob::new(
            UserId::new(user).expect("user id"),
            EventId::new(event).expect("event id"),
        )
    }

    #[derive(Default)]
    struct TraceRecorder {
        seen: Mutex<Vec<(i64, Option<TraceId>)>>,
    }

    #[async_trait]
    impl RegistrationNotifier for TraceRecorder {
        async fn notify(&self, user: UserId, _event: EventId) -> Result<bool, Error> {
            self.seen
                .lock()
                .expect("recorder lock")
                .push((user.get(), TraceId::current()));
            Ok(true)
        }
    }

    #[rstest]
    #[tokio::test]
    async fn worker_notifies_jobs_in_order_under_their_trace_id() {
        let (queue, receiver) = TokioNotificationQueue::channel();
        let trace_id = TraceId::generate();
        TraceId::scope(trace_id, async {
            queue.enqueue(job(1, 3)).await.expect("enqueue");
        })
        .await;
        queue.enqueue(job(2, 3)).await.expect("enqueue");
        drop(queue);

        let recorder = Arc::new(TraceRecorder::default());
        run_notification_worker(receiver, Arc::clone(&recorder) as Arc<dyn RegistrationNotifier>)
            .await;

        let seen = recorder.seen.lock().expect("recorder lock").clone();
        assert_eq!(seen, vec![(1, Some(trace_id)), (2, None)]);
    }

    #[rstest]
    #[tokio::test]
    async fn notifier_errors_do_not_stop_the_worker() {
        let (queue, receiver) = TokioNotificationQueue::channel();
        queue.enqueue(job(1, 3)).await.expect("enqueue");
        queue.enqueue(job(2, 3)).await.expect("enqueue");
        drop(queue);

        let mut notifier = MockRegistrationNotifier::new();
        notifier
            .expect_notify()
            .times(2)
            .returning(|user, _| {
                if user.get() == 1 {
                    Err(Error::service_unavailable("smtp down"))
                } else {
                    Ok(true)
                }
            });

        let handle = spawn_notification_worker(receiver, Arc::new(notifier));
        handle.await.expect("worker completes");
    }

    #[rstest]
    #[tokio::test]
    async fn enqueue_after_worker_stops_is_unavailable() {
        let (queue, receiver) = TokioNotificationQueue::channel();
        drop(receiver);

        let err = queue.enqueue(job(1, 3)).await.expect_err("closed channel");

        assert!(matches!(err, JobDispatchError::Unavailable { .. }), "{err:?}");
    }
}
