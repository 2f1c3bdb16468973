//! PostgreSQL-backed `EventRepository` implementation using Diesel ORM.
//!
//! Every read joins the organiser so events leave the adapter with their
//! `UserSummary` resolved. Listings are ordered by date, then title, then id
//! so pages stay stable when several events share a start time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::PageParams;

use crate::domain::ports::{EventRepository, EventRepositoryError, NewEventRecord};
use crate::domain::{
    Event, EventChanges, EventFilter, EventId, EventParts, Listing, UserId, UserSummary,
    Username,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{EventChangeset, EventRow, NewEventRow, UserSummaryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{events, users};

type EventsWithOrganizer = diesel::helper_types::InnerJoin<events::table, users::table>;
type BoxedEventQuery<'a> = diesel::helper_types::IntoBoxed<'a, EventsWithOrganizer, Pg>;

/// Diesel-backed implementation of the `EventRepository` port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EventRepositoryError {
    map_basic_pool_error(error, EventRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> EventRepositoryError {
    map_basic_diesel_error(
        error,
        EventRepositoryError::query,
        EventRepositoryError::connection,
    )
}

/// Escape `LIKE` wildcards and wrap `term` for a substring match.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn filtered_events(filter: &EventFilter) -> BoxedEventQuery<'static> {
    let mut query = events::table.inner_join(users::table).into_boxed();
    if let Some(organizer) = filter.organizer() {
        query = query.filter(events::organizer_id.eq(organizer.get()));
    }
    for term in filter.search_terms() {
        let pattern = contains_pattern(term);
        query = query.filter(
            events::title
                .ilike(pattern.clone())
                .or(events::description.ilike(pattern.clone()))
                .or(events::location.ilike(pattern.clone()))
                .or(users::username.ilike(pattern)),
        );
    }
    query
}

/// Convert a joined row into a validated domain event.
pub(crate) fn row_to_event(
    row: EventRow,
    organizer: UserSummaryRow,
) -> Result<Event, EventRepositoryError> {
    let corrupt = |detail: String| {
        EventRepositoryError::query(format!("invalid event row {}: {detail}", row.id))
    };
    let id = EventId::new(row.id).map_err(|err| corrupt(err.to_string()))?;
    let organizer = UserSummary {
        id: UserId::new(organizer.id).map_err(|err| corrupt(err.to_string()))?,
        username: Username::new(organizer.username).map_err(|err| corrupt(err.to_string()))?,
    };
    Event::new(EventParts {
        id,
        title: row.title,
        description: row.description,
        date: row.date,
        location: row.location,
        organizer,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| corrupt(err.to_string()))
}

async fn load_event(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> Result<Option<Event>, EventRepositoryError> {
    let row: Option<(EventRow, UserSummaryRow)> = events::table
        .inner_join(users::table)
        .filter(events::id.eq(id))
        .select((EventRow::as_select(), UserSummaryRow::as_select()))
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

    row.map(|(event, organizer)| row_to_event(event, organizer))
        .transpose()
}

fn to_sql_window(page: PageParams) -> Result<(i64, i64), EventRepositoryError> {
    let offset = i64::try_from(page.offset())
        .map_err(|_| EventRepositoryError::query("page offset out of range"))?;
    Ok((i64::from(page.limit()), offset))
}

fn to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn create(&self, record: &NewEventRecord) -> Result<Event, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let draft = &record.draft;
        let new_row = NewEventRow {
            title: draft.title(),
            description: draft.description(),
            date: draft.date(),
            location: draft.location(),
            organizer_id: record.organizer.get(),
            created_at: record.created_at,
            updated_at: record.created_at,
        };
        let id: i64 = diesel::insert_into(events::table)
            .values(&new_row)
            .returning(events::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        load_event(&mut conn, id)
            .await?
            .ok_or_else(|| EventRepositoryError::query(format!("event {id} vanished after insert")))
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_event(&mut conn, id.get()).await
    }

    async fn list(
        &self,
        filter: &EventFilter,
        page: PageParams,
    ) -> Result<Listing<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = to_sql_window(page)?;

        let total: i64 = filtered_events(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<(EventRow, UserSummaryRow)> = filtered_events(filter)
            .select((EventRow::as_select(), UserSummaryRow::as_select()))
            .order_by((events::date.asc(), events::title.asc(), events::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(|(event, organizer)| row_to_event(event, organizer))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing {
            items,
            total: to_total(total),
        })
    }

    async fn update(
        &self,
        id: EventId,
        changes: &EventChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = EventChangeset {
            title: changes.title(),
            description: changes.description(),
            date: changes.date(),
            location: changes.location(),
            updated_at,
        };
        let updated: Option<i64> = diesel::update(events::table.find(id.get()))
            .set(&changeset)
            .returning(events::id)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match updated {
            Some(id) => load_event(&mut conn, id).await,
            None => Ok(None),
        }
    }

    async fn delete(&self, id: EventId) -> Result<bool, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(events::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
