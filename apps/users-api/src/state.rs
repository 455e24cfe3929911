//! Application state management.
//!
//! The state carries the configuration and, when PostgreSQL is configured,
//! the connection pool. Without a pool the users domain runs on its
//! in-memory store.

use domain_users::InMemoryUserRepository;

/// Shared application state.
///
/// Cloned into each router; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL connection pool, if `DATABASE_URL` was set
    pub db: Option<database::postgres::DatabaseConnection>,
    /// Store used when `db` is `None`
    pub memory: InMemoryUserRepository,
}

impl AppState {
    pub fn new(
        config: crate::config::Config,
        db: Option<database::postgres::DatabaseConnection>,
    ) -> Self {
        Self {
            config,
            db,
            memory: InMemoryUserRepository::new(),
        }
    }

    pub fn store_name(&self) -> &'static str {
        if self.db.is_some() { "database" } else { "memory" }
    }
}
