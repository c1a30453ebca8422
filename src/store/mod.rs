//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → Store trait (this file)
//!     → postgres.rs (fresh PgConnection per call, closed before returning)
//!       or memory.rs (in-process tables for development and tests)
//! ```
//!
//! Both tables are append-only from the service's point of view: rows are
//! inserted and counted, never updated or deleted.

pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use models::{NewUser, NewVisit, Stats, User, Visit};
pub use postgres::PgStore;

use crate::config::{DatabaseConfig, StoreBackend};

/// Operations the HTTP handlers need from the relational store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short name used in logs.
    fn backend(&self) -> &'static str;

    /// Open and immediately release a connection.
    async fn ping(&self) -> Result<()>;

    /// Create `users` and `visits` if they do not exist.
    async fn init_schema(&self) -> Result<()>;

    async fn record_visit(&self, visit: &NewVisit) -> Result<()>;

    /// All users, newest `created_at` first.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Insert a user. Fails with [`StoreError::Conflict`] when the username
    /// or email is already taken.
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    async fn stats(&self) -> Result<Stats>;
}

/// Build the store selected by `config.backend`.
pub fn from_config(config: &DatabaseConfig) -> Arc<dyn Store> {
    match config.backend {
        StoreBackend::Postgres => Arc::new(PgStore::new(config)),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    }
}
