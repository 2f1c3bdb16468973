//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their corresponding
//! domain types but live in the inbound adapter layer where framework
//! concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request collides with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is temporarily unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Users not found: [7, 9]")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    #[schema(example = json!({"field": "participant_ids", "missing_ids": [7, 9]}))]
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Stable user identifier.
    #[schema(example = 7)]
    id: i64,
    /// Login name.
    #[schema(example = "ada")]
    username: String,
    /// Contact address for confirmation mail.
    #[schema(example = "ada@example.org")]
    email: Option<String>,
    /// Whether the user may manage any event.
    is_staff: bool,
}

/// OpenAPI schema for [`crate::domain::UserSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserSummary)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSummarySchema {
    /// Stable user identifier.
    #[schema(example = 7)]
    id: i64,
    /// Login name.
    #[schema(example = "ada")]
    username: String,
}

/// OpenAPI schema for [`crate::domain::Event`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Event)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EventSchema {
    #[schema(example = 3)]
    id: i64,
    #[schema(example = "Rust meetup")]
    title: String,
    description: String,
    #[schema(format = "date-time", example = "2026-06-01T18:30:00Z")]
    date: String,
    #[schema(example = "Hall A")]
    location: String,
    organizer: UserSummarySchema,
    #[schema(format = "date-time")]
    created_at: String,
    #[schema(format = "date-time")]
    updated_at: String,
}

/// OpenAPI schema for a page of events.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EventPageSchema {
    /// Events across all pages.
    count: u64,
    /// Link to the following page.
    next: Option<String>,
    /// Link to the preceding page.
    previous: Option<String>,
    results: Vec<EventSchema>,
}

/// OpenAPI schema for a page of participants.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ParticipantPageSchema {
    /// Participants across all pages.
    count: u64,
    /// Link to the following page.
    next: Option<String>,
    /// Link to the preceding page.
    previous: Option<String>,
    results: Vec<UserSummarySchema>,
}

/// OpenAPI schema for [`crate::domain::RegistrationOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RegistrationOutcome)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RegistrationOutcomeSchema {
    #[schema(example = 3)]
    event_id: i64,
    /// Participants registered by this call, in request order.
    #[schema(example = json!([1, 2]))]
    created_ids: Vec<i64>,
    /// Participants registered before this call, ascending.
    #[schema(example = json!([]))]
    already_registered_ids: Vec<i64>,
    #[schema(example = 2)]
    created_count: u64,
}

/// OpenAPI schema for [`crate::domain::UnregistrationOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UnregistrationOutcome)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UnregistrationOutcomeSchema {
    #[schema(example = 3)]
    event_id: i64,
    /// Participants whose registration was removed, ascending.
    #[schema(example = json!([1]))]
    deleted_ids: Vec<i64>,
    /// Participants that were not registered, ascending.
    #[schema(example = json!([4]))]
    not_found_ids: Vec<i64>,
    #[schema(example = 1)]
    deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_has_expected_name() {
        let schema_json = schema_to_json::<ErrorSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("message"));
        assert!(schema_json.contains("trace_id"));
    }

    #[test]
    fn error_code_schema_variants_match_domain() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn event_schema_nests_organizer() {
        let schema_json = schema_to_json::<EventSchema>();
        assert_eq!(EventSchema::name(), "crate.domain.Event");
        assert!(schema_json.contains("organizer"));
        assert!(schema_json.contains("location"));
    }

    #[test]
    fn registration_schema_lists_partitions() {
        let schema_json = schema_to_json::<RegistrationOutcomeSchema>();
        assert!(schema_json.contains("created_ids"));
        assert!(schema_json.contains("already_registered_ids"));
    }
}
