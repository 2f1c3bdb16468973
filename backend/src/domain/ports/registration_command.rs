//! Driving port for batch registration and unregistration.
//!
//! Both operations are idempotent reconciliations: repeating a call with the
//! same batch writes nothing and reports every participant in the
//! "already registered" or "not found" partition respectively.

use async_trait::async_trait;

use crate::domain::{
    Error, EventId, ParticipantBatch, RegistrationOutcome, UnregistrationOutcome,
};

/// Registration reconciliation use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Register every participant in `batch` for `event`.
    ///
    /// Fails with `NotFound` for a missing event and `InvalidRequest` when any
    /// participant does not exist; nothing is written in either case.
    async fn register(
        &self,
        event: EventId,
        batch: ParticipantBatch,
    ) -> Result<RegistrationOutcome, Error>;

    /// Remove the registrations of every participant in `batch`.
    async fn unregister(
        &self,
        event: EventId,
        batch: ParticipantBatch,
    ) -> Result<UnregistrationOutcome, Error>;
}
