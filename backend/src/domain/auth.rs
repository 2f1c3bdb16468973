//! Authentication primitives: login credentials, sign-up payloads and
//! profile changes.
//!
//! Inbound payload parsing stays outside the domain; handlers call these
//! constructors before talking to a port so services only see validated
//! values. Passwords are held in [`Zeroizing`] buffers.

use zeroize::Zeroizing;

use crate::domain::{EmailAddress, UserValidationError, Username};

/// Minimum password length accepted at sign-up.
pub const PASSWORD_MIN_LEN: usize = 5;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is non-empty and retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use events_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "hunter22").expect("valid");
/// assert_eq!(creds.username(), "ada");
/// assert_eq!(creds.password(), "hunter22");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validation failures for sign-up payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignUpValidationError {
    /// Username or email failed validation.
    #[error(transparent)]
    User(#[from] UserValidationError),
    /// Password shorter than [`PASSWORD_MIN_LEN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    username: Username,
    email: Option<EmailAddress>,
    password: Zeroizing<String>,
}

impl NewAccount {
    /// Validate raw sign-up values. A blank email is treated as absent.
    pub fn try_from_parts(
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> Result<Self, SignUpValidationError> {
        let username = Username::new(username.trim())?;
        let email = match email.map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(EmailAddress::new(raw)?),
            _ => None,
        };
        Ok(Self {
            username,
            email,
            password: validate_password(password)?,
        })
    }

    /// Requested login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Optional contact address.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Plain-text password, only used to derive a digest.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

fn validate_password(password: &str) -> Result<Zeroizing<String>, SignUpValidationError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(SignUpValidationError::PasswordTooShort {
            min: PASSWORD_MIN_LEN,
        });
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated partial update of the caller's own account.
///
/// Absent fields are left untouched. An email of `Some(None)` clears the
/// stored address.
///
/// # Examples
/// ```
/// use events_backend::domain::AccountChanges;
///
/// let changes = AccountChanges::try_from_parts(None, Some(""), Some("new-secret"))
///     .expect("valid changes");
/// assert!(changes.username().is_none());
/// assert_eq!(changes.email(), Some(None));
/// assert_eq!(changes.password(), Some("new-secret"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    username: Option<Username>,
    email: Option<Option<EmailAddress>>,
    password: Option<Zeroizing<String>>,
}

impl AccountChanges {
    /// Validate the supplied fields with the sign-up rules. A blank email
    /// clears the address.
    pub fn try_from_parts(
        username: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, SignUpValidationError> {
        let username = username
            .map(|raw| Username::new(raw.trim()))
            .transpose()?;
        let email = match email.map(str::trim) {
            Some("") => Some(None),
            Some(raw) => Some(Some(EmailAddress::new(raw)?)),
            None => None,
        };
        let password = password.map(validate_password).transpose()?;
        Ok(Self {
            username,
            email,
            password,
        })
    }

    /// New login name, if changing.
    pub fn username(&self) -> Option<&Username> {
        self.username.as_ref()
    }

    /// New email, if changing; `Some(None)` clears it.
    pub fn email(&self) -> Option<Option<&EmailAddress>> {
        self.email.as_ref().map(Option::as_ref)
    }

    /// New plain-text password, only used to derive a digest.
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|password| password.as_str())
    }

    /// Whether no field is being changed.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }
}
