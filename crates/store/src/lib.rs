//! `rentaldesk-store` — relational store access for the rental tool server.
//!
//! The [`RentalStore`](r#trait::RentalStore) trait is the seam between the
//! tool surface and persistence. Two implementations exist:
//!
//! - [`PostgresStore`](postgres::PostgresStore): the production store, one
//!   pooled sqlx connection set against the rental schema.
//! - [`InMemoryStore`](in_memory::InMemoryStore): tests/dev twin enforcing
//!   the same state-transition semantics without a database.

pub mod config;
pub mod guard;
pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use config::{ConfigError, StoreConfig};
pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{FilmFilter, RentalStore, RevenueGrouping};
