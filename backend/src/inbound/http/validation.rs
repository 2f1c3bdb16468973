//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose `details` name the
//! offending field and a stable machine-readable `code`.

use chrono::{DateTime, Utc};
use pagination::{PageParams, PaginationError};
use serde_json::json;

use crate::domain::{
    Error, EventValidationError, ParticipantBatchError, SignUpValidationError,
    UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidTimestamp,
    InvalidId,
    Blank,
    TooLong,
    EmptyBatch,
    InvalidUsername,
    InvalidEmail,
    PasswordTooShort,
    InvalidLimit,
    InvalidCursor,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::Blank => "blank",
            ErrorCode::TooLong => "too_long",
            ErrorCode::EmptyBatch => "empty_batch",
            ErrorCode::InvalidUsername => "invalid_username",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::PasswordTooShort => "password_too_short",
            ErrorCode::InvalidLimit => "invalid_limit",
            ErrorCode::InvalidCursor => "invalid_cursor",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }

    fn with_index(self, code: ErrorCode, index: usize, value: i64) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be an RFC 3339 timestamp"))
        .with_value(ErrorCode::InvalidTimestamp, value)
}

pub(crate) fn parse_rfc3339_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| invalid_timestamp_error(field, &value))
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

/// Reject a non-positive identifier taken from a path or query string.
pub(crate) fn invalid_id_error(field: FieldName, value: i64) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a positive integer"))
        .with_value(ErrorCode::InvalidId, value.to_string())
}

pub(crate) fn map_event_validation_error(err: EventValidationError) -> Error {
    let message = err.to_string();
    match err {
        EventValidationError::NonPositiveId { value } => {
            invalid_id_error(FieldName::new("id"), value)
        }
        EventValidationError::Blank { field } => {
            ValidationError::new(field, message).with_code(ErrorCode::Blank)
        }
        EventValidationError::TooLong { field, .. } => {
            ValidationError::new(field, message).with_code(ErrorCode::TooLong)
        }
    }
}

pub(crate) fn map_participant_batch_error(err: ParticipantBatchError) -> Error {
    let field = "participant_ids";
    let message = err.to_string();
    match err {
        ParticipantBatchError::Empty => {
            ValidationError::new(field, message).with_code(ErrorCode::EmptyBatch)
        }
        ParticipantBatchError::NonPositive { index, value } => {
            ValidationError::new(field, message).with_index(ErrorCode::InvalidId, index, value)
        }
    }
}

pub(crate) fn map_sign_up_validation_error(err: SignUpValidationError) -> Error {
    let message = err.to_string();
    match err {
        SignUpValidationError::User(UserValidationError::InvalidEmail) => {
            ValidationError::new("email", message).with_code(ErrorCode::InvalidEmail)
        }
        SignUpValidationError::User(_) => {
            ValidationError::new("username", message).with_code(ErrorCode::InvalidUsername)
        }
        SignUpValidationError::PasswordTooShort { .. } => {
            ValidationError::new("password", message).with_code(ErrorCode::PasswordTooShort)
        }
    }
}

/// Validate `limit`/`cursor` query values into page parameters.
pub(crate) fn parse_page_params(
    limit: Option<u32>,
    cursor: Option<&str>,
) -> Result<PageParams, Error> {
    PageParams::new(limit, cursor).map_err(|err| {
        let message = err.to_string();
        match err {
            PaginationError::ZeroLimit => {
                ValidationError::new("limit", message).with_code(ErrorCode::InvalidLimit)
            }
            PaginationError::Cursor(_) | PaginationError::OffsetOutOfRange { .. } => {
                ValidationError::new("cursor", message)
                    .with_value(ErrorCode::InvalidCursor, cursor.unwrap_or_default())
            }
        }
    })
}
