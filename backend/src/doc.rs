//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (users, events,
//!   registrations, health)
//! - **Schemas**: wrappers in [`crate::inbound::http::schemas`] that describe
//!   domain types without coupling them to utoipa
//! - **Security**: Session cookie authentication scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::events::{CreateEventRequest, UpdateEventRequest};
use crate::inbound::http::registrations::ParticipantsRequest;
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, EventPageSchema, EventSchema, ParticipantPageSchema,
    RegistrationOutcomeSchema, UnregistrationOutcomeSchema, UserSchema, UserSummarySchema,
};
use crate::inbound::http::users::{LoginRequest, SignUpRequest, UpdateAccountRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Events backend API",
        description = "Event management, participant registration, and session-authenticated accounts.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::sign_up,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::get_event,
        crate::inbound::http::events::update_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::registrations::register,
        crate::inbound::http::registrations::unregister,
        crate::inbound::http::registrations::list_participants,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserSchema,
        UserSummarySchema,
        EventSchema,
        EventPageSchema,
        ParticipantPageSchema,
        RegistrationOutcomeSchema,
        UnregistrationOutcomeSchema,
        ErrorSchema,
        ErrorCodeSchema,
        LoginRequest,
        SignUpRequest,
        UpdateAccountRequest,
        CreateEventRequest,
        UpdateEventRequest,
        ParticipantsRequest,
    )),
    tags(
        (name = "users", description = "Accounts and sessions"),
        (name = "events", description = "Event management"),
        (name = "registrations", description = "Participant registration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.
    //!
    //! Endpoint registration is covered by `backend/tests/openapi_paths.rs`.

    use super::*;
    use utoipa::openapi::schema::Schema;
    use utoipa::openapi::RefOr;
    use utoipa::OpenApi;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const USER_SCHEMA_NAME: &str = "crate.domain.User";
    const EVENT_SCHEMA_NAME: &str = "crate.domain.Event";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn openapi_user_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user_schema = schemas.get(USER_SCHEMA_NAME).expect("User schema");

        assert_object_schema_has_field(user_schema, "id");
        assert_object_schema_has_field(user_schema, "username");
        assert_object_schema_has_field(user_schema, "is_staff");
    }

    #[test]
    fn openapi_event_schema_embeds_organizer() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let event_schema = schemas.get(EVENT_SCHEMA_NAME).expect("Event schema");

        assert_object_schema_has_field(event_schema, "title");
        assert_object_schema_has_field(event_schema, "organizer");
    }

    #[test]
    fn openapi_registers_session_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
