//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the user, event, and
//! registration ports backed by PostgreSQL via the Diesel ORM with async
//! support through `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer. Rows are re-validated on the way out.
//! - **Explicit transactions**: registration reconciliation holds one owned
//!   connection and an open transaction until the domain commits.
//! - **Strongly typed errors**: All database errors are mapped to the
//!   corresponding port error types.
//!
//! # Example
//!
//! ```ignore
//! use events_backend::outbound::persistence::{DbPool, PoolConfig, DieselEventRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/events");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselEventRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_event_repository;
mod diesel_registration_store;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_event_repository::DieselEventRepository;
pub use diesel_registration_store::{DieselRegistrationStore, DieselRegistrationTransaction};
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
