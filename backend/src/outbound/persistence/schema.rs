//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts table.
    ///
    /// The `id` column is a `BIGSERIAL` primary key; `username` is unique.
    users (id) {
        /// Primary key.
        id -> Int8,
        /// Login name (max 150 characters, unique).
        username -> Varchar,
        /// Optional contact address for confirmation mail.
        email -> Nullable<Varchar>,
        /// Staff users may manage any event.
        is_staff -> Bool,
        /// Encoded salted digest, never exposed through the API.
        password_digest -> Varchar,
        /// Account creation timestamp.
        date_joined -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled events.
    events (id) {
        /// Primary key.
        id -> Int8,
        /// Title (max 255 characters).
        title -> Varchar,
        /// Free-form description, possibly empty.
        description -> Text,
        /// Scheduled start.
        date -> Timestamptz,
        /// Venue (max 255 characters).
        location -> Varchar,
        /// Owning user; deleting the user cascades.
        organizer_id -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Event participation. `(event_id, participant_id)` is unique.
    registrations (id) {
        /// Primary key.
        id -> Int8,
        /// Registered event; deleting the event cascades.
        event_id -> Int8,
        /// Registered user; deleting the user cascades.
        participant_id -> Int8,
        /// When the registration was written.
        registered_at -> Timestamptz,
    }
}

diesel::joinable!(events -> users (organizer_id));
diesel::joinable!(registrations -> events (event_id));
diesel::joinable!(registrations -> users (participant_id));

diesel::allow_tables_to_appear_in_same_query!(events, registrations, users);
