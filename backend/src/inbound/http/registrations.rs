//! Registration API handlers.
//!
//! ```text
//! POST /api/v1/events/3/register {"participant_ids":[1,2]}
//! POST /api/v1/events/3/unregister {"participant_ids":[1]}
//! GET /api/v1/events/3/participants?limit=20
//! ```
//!
//! Registration and unregistration are idempotent: repeating a call reports
//! the already-satisfied participants instead of failing.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, ParticipantBatch, RegistrationStatus, UnregistrationOutcome, UserSummary,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::events::parse_event_id;
use crate::inbound::http::schemas::{
    ErrorSchema, ParticipantPageSchema, RegistrationOutcomeSchema, UnregistrationOutcomeSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_participant_batch_error, parse_page_params};

/// Request body shared by register and unregister.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ParticipantsRequest {
    /// Positive user identifiers; duplicates collapse.
    #[schema(example = json!([1, 2]))]
    pub participant_ids: Vec<i64>,
}

impl TryFrom<ParticipantsRequest> for ParticipantBatch {
    type Error = Error;

    fn try_from(value: ParticipantsRequest) -> Result<Self, Self::Error> {
        Self::new(value.participant_ids).map_err(map_participant_batch_error)
    }
}

/// Query string for `GET /api/v1/events/{id}/participants`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ParticipantsPageQuery {
    /// Page size (default 20, at most 100).
    pub limit: Option<u32>,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

/// Register participants for an event.
///
/// Answers `201 Created` when at least one registration was written and
/// `200 OK` when every participant was already registered.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/register",
    params(("id" = i64, Path, description = "Event identifier")),
    request_body = ParticipantsRequest,
    responses(
        (status = 201, description = "Registrations created", body = RegistrationOutcomeSchema),
        (status = 200, description = "Every participant was already registered", body = RegistrationOutcomeSchema),
        (status = 400, description = "Invalid batch or unknown users", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Event not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "registerParticipants",
    security(("SessionCookie" = []))
)]
#[post("/events/{id}/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<ParticipantsRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let event = parse_event_id(path.into_inner())?;
    let batch = ParticipantBatch::try_from(payload.into_inner())?;
    let outcome = state.registrations.register(event, batch).await?;
    let mut response = match outcome.status() {
        RegistrationStatus::Created => HttpResponse::Created(),
        RegistrationStatus::AlreadySatisfied => HttpResponse::Ok(),
    };
    Ok(response.json(outcome))
}

/// Remove participants from an event.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/unregister",
    params(("id" = i64, Path, description = "Event identifier")),
    request_body = ParticipantsRequest,
    responses(
        (status = 200, description = "Registrations removed", body = UnregistrationOutcomeSchema),
        (status = 400, description = "Invalid batch or unknown users", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Event not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "unregisterParticipants",
    security(("SessionCookie" = []))
)]
#[post("/events/{id}/unregister")]
pub async fn unregister(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<ParticipantsRequest>,
) -> ApiResult<web::Json<UnregistrationOutcome>> {
    session.require_user_id()?;
    let event = parse_event_id(path.into_inner())?;
    let batch = ParticipantBatch::try_from(payload.into_inner())?;
    let outcome = state.registrations.unregister(event, batch).await?;
    Ok(web::Json(outcome))
}

/// List the registered participants of an event. Readable anonymously.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/participants",
    params(("id" = i64, Path, description = "Event identifier"), ParticipantsPageQuery),
    responses(
        (status = 200, description = "Participants ordered by id", body = ParticipantPageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Event not found", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "listParticipants",
    security([])
)]
#[get("/events/{id}/participants")]
pub async fn list_participants(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<ParticipantsPageQuery>,
) -> ApiResult<web::Json<Page<UserSummary>>> {
    let event = parse_event_id(path.into_inner())?;
    let page = parse_page_params(query.limit, query.cursor.as_deref())?;
    let listing = state.participants.list_participants(event, page).await?;
    Ok(web::Json(Page::new(
        listing.items,
        listing.total,
        &page,
        &req.full_url(),
    )))
}

#[cfg(test)]
#[path = "registrations_tests.rs"]
mod tests;
