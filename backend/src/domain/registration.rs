//! Registration batches and reconciliation outcomes.
//!
//! A batch is the set of participants a caller wants registered (or
//! unregistered) for one event. Outcomes report the set differences between
//! the batch and the rows the store actually holds.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{EventId, UserId};

/// Validation failures for participant batches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParticipantBatchError {
    /// No participant identifiers were supplied.
    #[error("participant_ids must not be empty")]
    Empty,
    /// An identifier was zero or negative.
    #[error("participant_ids[{index}] must be a positive integer, got {value}")]
    NonPositive {
        /// Position within the request.
        index: usize,
        /// Offending value.
        value: i64,
    },
}

/// Non-empty set of participants, in first-seen request order.
///
/// # Examples
/// ```
/// use events_backend::domain::ParticipantBatch;
///
/// let batch = ParticipantBatch::new(vec![3, 1, 3]).expect("valid batch");
/// let ids: Vec<i64> = batch.ids().iter().map(|id| id.get()).collect();
/// assert_eq!(ids, [3, 1]);
/// assert!(ParticipantBatch::new(vec![]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantBatch(Vec<UserId>);

impl ParticipantBatch {
    /// Validate raw identifiers. Duplicates collapse to their first occurrence.
    pub fn new(raw: Vec<i64>) -> Result<Self, ParticipantBatchError> {
        if raw.is_empty() {
            return Err(ParticipantBatchError::Empty);
        }
        let mut seen = HashSet::with_capacity(raw.len());
        let mut ids = Vec::with_capacity(raw.len());
        for (index, value) in raw.into_iter().enumerate() {
            let id = UserId::new(value)
                .map_err(|_| ParticipantBatchError::NonPositive { index, value })?;
            if seen.insert(id) {
                ids.push(id);
            }
        }
        Ok(Self(ids))
    }

    /// Identifiers in request order.
    pub fn ids(&self) -> &[UserId] {
        &self.0
    }

    /// Number of distinct participants.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; batches are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identifiers not contained in `present`, request order preserved.
    pub fn excluding(&self, present: &[UserId]) -> Vec<UserId> {
        let present: HashSet<&UserId> = present.iter().collect();
        self.0
            .iter()
            .filter(|id| !present.contains(id))
            .copied()
            .collect()
    }
}

/// Whether a registration call wrote anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// At least one registration was created.
    Created,
    /// Every participant was already registered.
    AlreadySatisfied,
}

/// Result of reconciling a registration batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    /// Target event.
    pub event_id: EventId,
    /// Participants that were not yet registered, in request order.
    pub created_ids: Vec<UserId>,
    /// Participants already registered before the call, ascending.
    pub already_registered_ids: Vec<UserId>,
    /// Length of `created_ids`.
    pub created_count: usize,
}

impl RegistrationOutcome {
    /// Build an outcome from the two partitions.
    pub fn new(
        event_id: EventId,
        created_ids: Vec<UserId>,
        already_registered_ids: Vec<UserId>,
    ) -> Self {
        let created_count = created_ids.len();
        Self {
            event_id,
            created_ids,
            already_registered_ids,
            created_count,
        }
    }

    /// `Created` when anything was written, otherwise `AlreadySatisfied`.
    pub fn status(&self) -> RegistrationStatus {
        if self.created_ids.is_empty() {
            RegistrationStatus::AlreadySatisfied
        } else {
            RegistrationStatus::Created
        }
    }
}

/// Result of reconciling an unregistration batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnregistrationOutcome {
    /// Target event.
    pub event_id: EventId,
    /// Participants whose registration was removed, ascending.
    pub deleted_ids: Vec<UserId>,
    /// Participants that had no registration, ascending.
    pub not_found_ids: Vec<UserId>,
    /// Length of `deleted_ids`.
    pub deleted_count: usize,
}

impl UnregistrationOutcome {
    /// Build an outcome from the batch and the identifiers actually deleted.
    pub fn new(event_id: EventId, batch: &ParticipantBatch, mut deleted_ids: Vec<UserId>) -> Self {
        deleted_ids.sort_unstable();
        deleted_ids.dedup();
        let mut not_found_ids = batch.excluding(&deleted_ids);
        not_found_ids.sort_unstable();
        let deleted_count = deleted_ids.len();
        Self {
            event_id,
            deleted_ids,
            not_found_ids,
            deleted_count,
        }
    }
}
