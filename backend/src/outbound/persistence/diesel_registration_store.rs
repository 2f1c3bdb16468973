//! PostgreSQL-backed `RegistrationStore` implementation using Diesel ORM.
//!
//! A [`DieselRegistrationTransaction`] owns one pooled connection for the
//! whole reconciliation. `event_exists` takes `FOR SHARE` on the event row, so
//! a concurrent delete of the event blocks until this transaction ends, while
//! concurrent registrations for the same event still proceed. Inserts rely on
//! the `(event_id, participant_id)` unique constraint with `ON CONFLICT DO
//! NOTHING` so racing requests never fail on duplicates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use pagination::PageParams;
use tracing::{debug, warn};

use crate::domain::ports::{RegistrationStore, RegistrationStoreError, RegistrationTransaction};
use crate::domain::{EventId, Listing, UserId, UserSummary, Username};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewRegistrationRow, UserSummaryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{events, registrations, users};

/// Diesel-backed implementation of the `RegistrationStore` port.
#[derive(Clone)]
pub struct DieselRegistrationStore {
    pool: DbPool,
}

impl DieselRegistrationStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RegistrationStoreError {
    map_basic_pool_error(error, RegistrationStoreError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RegistrationStoreError {
    map_basic_diesel_error(
        error,
        RegistrationStoreError::query,
        RegistrationStoreError::connection,
    )
}

fn raw_ids(ids: &[UserId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

fn to_user_ids(raw: Vec<i64>) -> Result<Vec<UserId>, RegistrationStoreError> {
    let mut ids = raw
        .into_iter()
        .map(|value| {
            UserId::new(value).map_err(|err| {
                RegistrationStoreError::query(format!("invalid user id {value}: {err}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Identifiers of `requested` absent from `found`, ascending.
pub(crate) fn absent_ids(requested: &[UserId], found: &[i64]) -> Vec<UserId> {
    let mut missing: Vec<UserId> = requested
        .iter()
        .copied()
        .filter(|id| !found.contains(&id.get()))
        .collect();
    missing.sort_unstable();
    missing.dedup();
    missing
}

fn row_to_summary(row: UserSummaryRow) -> Result<UserSummary, RegistrationStoreError> {
    let invalid = |err: crate::domain::UserValidationError| {
        RegistrationStoreError::query(format!("invalid participant row {}: {err}", row.id))
    };
    Ok(UserSummary {
        id: UserId::new(row.id).map_err(invalid)?,
        username: Username::new(row.username.clone()).map_err(invalid)?,
    })
}

#[async_trait]
impl RegistrationStore for DieselRegistrationStore {
    async fn begin(&self) -> Result<Box<dyn RegistrationTransaction>, RegistrationStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        debug!("registration transaction opened");
        Ok(Box::new(DieselRegistrationTransaction { conn, open: true }))
    }

    async fn participants(
        &self,
        event: EventId,
        page: PageParams,
    ) -> Result<Listing<UserSummary>, RegistrationStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let offset = i64::try_from(page.offset())
            .map_err(|_| RegistrationStoreError::query("page offset out of range"))?;

        let total: i64 = registrations::table
            .filter(registrations::event_id.eq(event.get()))
            .select(diesel::dsl::count_distinct(registrations::participant_id))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<UserSummaryRow> = registrations::table
            .inner_join(users::table)
            .filter(registrations::event_id.eq(event.get()))
            .select(UserSummaryRow::as_select())
            .distinct()
            .order_by(users::id.asc())
            .limit(i64::from(page.limit()))
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_summary)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}

/// One open PostgreSQL transaction over an owned pooled connection.
///
/// If dropped while still open, the pool discards the connection because
/// `diesel-async` reports it as mid-transaction, and the server rolls back.
pub struct DieselRegistrationTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
    open: bool,
}

impl DieselRegistrationTransaction {
    fn ensure_open(&self) -> Result<(), RegistrationStoreError> {
        if self.open {
            Ok(())
        } else {
            Err(RegistrationStoreError::query("transaction already finished"))
        }
    }
}

impl Drop for DieselRegistrationTransaction {
    fn drop(&mut self) {
        if self.open {
            warn!("registration transaction dropped while open; connection will be discarded");
        }
    }
}

#[async_trait]
impl RegistrationTransaction for DieselRegistrationTransaction {
    async fn event_exists(&mut self, event: EventId) -> Result<bool, RegistrationStoreError> {
        self.ensure_open()?;
        let found: Option<i64> = events::table
            .find(event.get())
            .select(events::id)
            .for_share()
            .first(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(found.is_some())
    }

    async fn missing_users(
        &mut self,
        ids: &[UserId],
    ) -> Result<Vec<UserId>, RegistrationStoreError> {
        self.ensure_open()?;
        let found: Vec<i64> = users::table
            .filter(users::id.eq_any(raw_ids(ids)))
            .select(users::id)
            .load(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(absent_ids(ids, &found))
    }

    async fn registered_participants(
        &mut self,
        event: EventId,
        ids: &[UserId],
    ) -> Result<Vec<UserId>, RegistrationStoreError> {
        self.ensure_open()?;
        let found: Vec<i64> = registrations::table
            .filter(registrations::event_id.eq(event.get()))
            .filter(registrations::participant_id.eq_any(raw_ids(ids)))
            .select(registrations::participant_id)
            .load(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        to_user_ids(found)
    }

    async fn insert_registrations(
        &mut self,
        event: EventId,
        ids: &[UserId],
        registered_at: DateTime<Utc>,
    ) -> Result<Vec<UserId>, RegistrationStoreError> {
        self.ensure_open()?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<NewRegistrationRow> = ids
            .iter()
            .map(|id| NewRegistrationRow {
                event_id: event.get(),
                participant_id: id.get(),
                registered_at,
            })
            .collect();
        let inserted: Vec<i64> = diesel::insert_into(registrations::table)
            .values(&rows)
            .on_conflict((registrations::event_id, registrations::participant_id))
            .do_nothing()
            .returning(registrations::participant_id)
            .get_results(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        if inserted.len() < rows.len() {
            debug!(
                event_id = %event,
                skipped = rows.len() - inserted.len(),
                "registrations already present were skipped"
            );
        }
        to_user_ids(inserted)
    }

    async fn delete_registrations(
        &mut self,
        event: EventId,
        ids: &[UserId],
    ) -> Result<Vec<UserId>, RegistrationStoreError> {
        self.ensure_open()?;
        let deleted: Vec<i64> = diesel::delete(
            registrations::table
                .filter(registrations::event_id.eq(event.get()))
                .filter(registrations::participant_id.eq_any(raw_ids(ids))),
        )
        .returning(registrations::participant_id)
        .get_results(&mut *self.conn)
        .await
        .map_err(map_diesel_error)?;
        to_user_ids(deleted)
    }

    async fn commit(&mut self) -> Result<(), RegistrationStoreError> {
        self.ensure_open()?;
        AnsiTransactionManager::commit_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        self.open = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), RegistrationStoreError> {
        self.ensure_open()?;
        self.open = false;
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)
    }
}
