//! Domain port describing queue dispatch semantics for notification jobs.
use async_trait::async_trait;

use crate::domain::RegistrationNotificationJob;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the queue adapter.
    pub enum JobDispatchError {
        /// Queue infrastructure is unavailable.
        Unavailable { message: String } => "notification queue is unavailable: {message}",
        /// The job could not be accepted.
        Rejected { message: String } => "notification job was rejected: {message}",
    }
}

/// Fire-and-forget hand-off of notification jobs to a background worker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// Enqueue a job for asynchronous dispatch.
    async fn enqueue(&self, job: RegistrationNotificationJob) -> Result<(), JobDispatchError>;
}
