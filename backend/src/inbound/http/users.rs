//! Account and session API handlers.
//!
//! ```text
//! POST /api/v1/users {"username":"ada","email":"ada@example.org","password":"secret"}
//! POST /api/v1/login {"username":"ada","password":"secret"}
//! POST /api/v1/logout
//! GET /api/v1/users/me
//! PATCH /api/v1/users/me {"email":"ada@example.org","password":"new-secret"}
//! ```

use crate::domain::{
    AccountChanges, Error, LoginCredentials, LoginValidationError, NewAccount, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_sign_up_validation_error;
use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// Login request body for `POST /api/v1/login`.
///
/// Example JSON:
/// `{"username":"ada","password":"secret"}`
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Sign-up request body for `POST /api/v1/users`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct SignUpRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.org")]
    #[serde(default)]
    pub email: Option<String>,
    #[schema(example = "secret")]
    pub password: String,
}

/// Partial update body for `PATCH /api/v1/users/me`.
///
/// Omitted fields stay as they are; an empty `email` clears the address.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateAccountRequest {
    #[schema(example = "ada")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[schema(example = "ada@example.org")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[schema(example = "new-secret")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username taken", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "signUp",
    security([])
)]
#[post("/users")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<SignUpRequest>,
) -> ApiResult<HttpResponse> {
    let SignUpRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let account = NewAccount::try_from_parts(&username, email.as_deref(), &password)
        .map_err(map_sign_up_validation_error)?;
    let user = state.accounts.sign_up(&account).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate user and establish a session.
///
/// Uses the centralised `Error` type so clients get a consistent
/// error schema across all endpoints.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserSchema, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(user.id())?;
    info!(user_id = %user.id(), "user logged in");
    Ok(web::Json(user))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Return the authenticated user.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use events_backend::inbound::http::users::current_user;
///
/// let app = App::new().service(current_user);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user_id = session.require_user_id()?;
    let user = state.accounts.current_user(user_id).await?;
    Ok(web::Json(user))
}

/// Change the authenticated user's username, email or password.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Username taken", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser",
    security(("SessionCookie" = []))
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateAccountRequest>,
) -> ApiResult<web::Json<User>> {
    let user_id = session.require_user_id()?;
    let UpdateAccountRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let changes =
        AccountChanges::try_from_parts(username.as_deref(), email.as_deref(), password.as_deref())
            .map_err(map_sign_up_validation_error)?;
    let user = state.accounts.update_current_user(user_id, &changes).await?;
    Ok(web::Json(user))
}
