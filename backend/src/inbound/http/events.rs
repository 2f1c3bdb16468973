//! Event API handlers.
//!
//! ```text
//! GET /api/v1/events?organizer=7&search=rust%20meetup&limit=20
//! POST /api/v1/events {"title":"Rust meetup","date":"2026-06-01T18:30:00Z","location":"Hall A"}
//! GET /api/v1/events/3
//! PATCH /api/v1/events/3 {"location":"Hall B"}
//! DELETE /api/v1/events/3
//! ```
//!
//! The organiser is always the authenticated caller; any `organizer` value in
//! a request body is ignored.

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, Event, EventChanges, EventDraft, EventFilter, EventId, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, EventPageSchema, EventSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_id_error, map_event_validation_error, parse_optional_rfc3339_timestamp,
    parse_page_params, parse_rfc3339_timestamp,
};

/// Request body for `POST /api/v1/events`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Rust meetup")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// RFC 3339 timestamp.
    #[schema(format = "date-time", example = "2026-06-01T18:30:00Z")]
    pub date: String,
    #[schema(example = "Hall A")]
    pub location: String,
}

/// Request body for `PATCH /api/v1/events/{id}`; absent fields are kept.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// RFC 3339 timestamp.
    #[schema(format = "date-time")]
    pub date: Option<String>,
    pub location: Option<String>,
}

/// Query string for `GET /api/v1/events`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// Only events organised by this user.
    pub organizer: Option<i64>,
    /// Whitespace-separated terms; every term must match.
    pub search: Option<String>,
    /// Page size (default 20, at most 100).
    pub limit: Option<u32>,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

pub(crate) fn parse_event_id(raw: i64) -> Result<EventId, Error> {
    EventId::new(raw).map_err(|_| invalid_id_error(FieldName::new("id"), raw))
}

fn parse_create_request(payload: CreateEventRequest) -> Result<EventDraft, Error> {
    let date = parse_rfc3339_timestamp(payload.date, FieldName::new("date"))?;
    EventDraft::new(payload.title, payload.description, date, payload.location)
        .map_err(map_event_validation_error)
}

fn parse_update_request(payload: UpdateEventRequest) -> Result<EventChanges, Error> {
    let date = parse_optional_rfc3339_timestamp(payload.date, FieldName::new("date"))?;
    EventChanges::new(payload.title, payload.description, date, payload.location)
        .map_err(map_event_validation_error)
}

fn parse_filter(query: &EventListQuery) -> Result<EventFilter, Error> {
    let organizer = query
        .organizer
        .map(|raw| UserId::new(raw).map_err(|_| invalid_id_error(FieldName::new("organizer"), raw)))
        .transpose()?;
    Ok(EventFilter::new(organizer, query.search.as_deref()))
}

/// List events visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(EventListQuery),
    responses(
        (status = 200, description = "Events ordered by date then title", body = EventPageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "listEvents",
    security(("SessionCookie" = []))
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<EventListQuery>,
) -> ApiResult<web::Json<Page<Event>>> {
    session.require_user_id()?;
    let query = query.into_inner();
    let filter = parse_filter(&query)?;
    let page = parse_page_params(query.limit, query.cursor.as_deref())?;
    let listing = state.events_query.list(filter, page).await?;
    Ok(web::Json(Page::new(
        listing.items,
        listing.total,
        &page,
        &req.full_url(),
    )))
}

/// Create an event organised by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "createEvent",
    security(("SessionCookie" = []))
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateEventRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let draft = parse_create_request(payload.into_inner())?;
    let event = state.events.create(caller, draft).await?;
    Ok(HttpResponse::Created().json(event))
}

/// Fetch one event.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    params(("id" = i64, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Event", body = EventSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "getEvent",
    security(("SessionCookie" = []))
)]
#[get("/events/{id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Event>> {
    session.require_user_id()?;
    let id = parse_event_id(path.into_inner())?;
    let event = state.events_query.get(id).await?;
    Ok(web::Json(event))
}

/// Partially update an event. Only its organiser or staff may do so.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}",
    params(("id" = i64, Path, description = "Event identifier")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = EventSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller may not manage this event", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "updateEvent",
    security(("SessionCookie" = []))
)]
#[patch("/events/{id}")]
pub async fn update_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<UpdateEventRequest>,
) -> ApiResult<web::Json<Event>> {
    let caller = session.require_user_id()?;
    let id = parse_event_id(path.into_inner())?;
    let changes = parse_update_request(payload.into_inner())?;
    let event = state.events.update(caller, id, changes).await?;
    Ok(web::Json(event))
}

/// Delete an event together with its registrations.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    params(("id" = i64, Path, description = "Event identifier")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller may not manage this event", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "deleteEvent",
    security(("SessionCookie" = []))
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id = parse_event_id(path.into_inner())?;
    state.events.delete(caller, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
