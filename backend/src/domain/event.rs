//! Event aggregate, drafts, partial updates, and list filters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{UserId, UserSummary};

/// Maximum length of an event title.
pub const TITLE_MAX: usize = 255;
/// Maximum length of an event location.
pub const LOCATION_MAX: usize = 255;

/// Validation errors for event fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    /// Identifier was zero or negative.
    #[error("event id must be a positive integer, got {value}")]
    NonPositiveId {
        /// Offending value.
        value: i64,
    },
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    Blank {
        /// Field name.
        field: &'static str,
    },
    /// A text field exceeded its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },
}

impl EventValidationError {
    /// Name of the offending field, when the error concerns one.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveId { .. } => "id",
            Self::Blank { field } | Self::TooLong { field, .. } => field,
        }
    }
}

/// Stable positive event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct EventId(i64);

impl EventId {
    /// Validate and construct an [`EventId`].
    pub fn new(value: i64) -> Result<Self, EventValidationError> {
        if value <= 0 {
            return Err(EventValidationError::NonPositiveId { value });
        }
        Ok(Self(value))
    }

    /// Raw integer value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EventId> for i64 {
    fn from(value: EventId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for EventId {
    type Error = EventValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn bounded_text(
    value: impl Into<String>,
    field: &'static str,
    max: usize,
) -> Result<String, EventValidationError> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(EventValidationError::Blank { field });
    }
    if value.chars().count() > max {
        return Err(EventValidationError::TooLong { field, max });
    }
    Ok(value)
}

/// Validated fields for a new event. The organiser comes from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    title: String,
    description: String,
    date: DateTime<Utc>,
    location: String,
}

impl EventDraft {
    /// Validate raw values for a new event.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use events_backend::domain::EventDraft;
    ///
    /// let date = Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).single().expect("date");
    /// let draft = EventDraft::new("Rust meetup", "", date, "Leeds").expect("valid");
    /// assert_eq!(draft.title(), "Rust meetup");
    /// assert!(EventDraft::new(" ", "", date, "Leeds").is_err());
    /// ```
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: DateTime<Utc>,
        location: impl Into<String>,
    ) -> Result<Self, EventValidationError> {
        Ok(Self {
            title: bounded_text(title, "title", TITLE_MAX)?,
            description: description.into(),
            date,
            location: bounded_text(location, "location", LOCATION_MAX)?,
        })
    }

    /// Event title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-form description; may be empty.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Scheduled start.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Venue.
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Validated partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventChanges {
    title: Option<String>,
    description: Option<String>,
    date: Option<DateTime<Utc>>,
    location: Option<String>,
}

impl EventChanges {
    /// Validate the supplied fields.
    pub fn new(
        title: Option<String>,
        description: Option<String>,
        date: Option<DateTime<Utc>>,
        location: Option<String>,
    ) -> Result<Self, EventValidationError> {
        Ok(Self {
            title: title
                .map(|value| bounded_text(value, "title", TITLE_MAX))
                .transpose()?,
            description,
            date,
            location: location
                .map(|value| bounded_text(value, "location", LOCATION_MAX))
                .transpose()?,
        })
    }

    /// New title, if changing.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// New description, if changing.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// New date, if changing.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    /// New location, if changing.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Whether no field is being changed.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.location.is_none()
    }
}

/// Raw event fields as loaded from storage, validated by [`Event::new`].
#[derive(Debug, Clone)]
pub struct EventParts {
    /// Identifier.
    pub id: EventId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Scheduled start.
    pub date: DateTime<Utc>,
    /// Venue.
    pub location: String,
    /// Owning user.
    pub organizer: UserSummary,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Scheduled event owned by an organiser.
///
/// ## Invariants
/// - `title` and `location` are non-blank and at most 255 characters.
/// - `organizer` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    title: String,
    description: String,
    date: DateTime<Utc>,
    location: String,
    organizer: UserSummary,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Event {
    /// Validate stored fields into an event.
    pub fn new(parts: EventParts) -> Result<Self, EventValidationError> {
        let EventParts {
            id,
            title,
            description,
            date,
            location,
            organizer,
            created_at,
            updated_at,
        } = parts;
        Ok(Self {
            id,
            title: bounded_text(title, "title", TITLE_MAX)?,
            description,
            date,
            location: bounded_text(location, "location", LOCATION_MAX)?,
            organizer,
            created_at,
            updated_at,
        })
    }

    /// Identifier.
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Scheduled start.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Venue.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Owning user.
    pub fn organizer(&self) -> &UserSummary {
        &self.organizer
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether `user` organises this event.
    pub fn is_organized_by(&self, user: UserId) -> bool {
        self.organizer.id == user
    }
}

/// Filters accepted by event listings.
///
/// Every search term must match, case-insensitively, at least one of the
/// title, description, location, or organiser username.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    organizer: Option<UserId>,
    search_terms: Vec<String>,
}

impl EventFilter {
    /// Build a filter from an optional organiser and a raw search string.
    ///
    /// Terms are split on whitespace and commas.
    ///
    /// # Examples
    /// ```
    /// use events_backend::domain::EventFilter;
    ///
    /// let filter = EventFilter::new(None, Some("jazz, leeds  night"));
    /// assert_eq!(filter.search_terms(), ["jazz", "leeds", "night"]);
    /// ```
    pub fn new(organizer: Option<UserId>, search: Option<&str>) -> Self {
        let search_terms = search
            .map(|raw| {
                raw.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|term| !term.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            organizer,
            search_terms,
        }
    }

    /// Organiser restriction, if any.
    pub fn organizer(&self) -> Option<UserId> {
        self.organizer
    }

    /// Search terms, all of which must match.
    pub fn search_terms(&self) -> &[String] {
        &self.search_terms
    }

    /// Evaluate the filter against an event in memory.
    pub fn matches(&self, event: &Event) -> bool {
        if self
            .organizer
            .is_some_and(|organizer| !event.is_organized_by(organizer))
        {
            return false;
        }
        let haystacks = [
            event.title().to_lowercase(),
            event.description().to_lowercase(),
            event.location().to_lowercase(),
            event.organizer().username.as_ref().to_lowercase(),
        ];
        self.search_terms.iter().all(|term| {
            let needle = term.to_lowercase();
            haystacks.iter().any(|haystack| haystack.contains(&needle))
        })
    }
}
