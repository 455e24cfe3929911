use axum::Router;
use domain_users::{PgUserRepository, UserService, handlers};

/// Users router backed by PostgreSQL when a pool is configured, otherwise by
/// the state's in-memory store.
pub fn router(state: &crate::state::AppState) -> Router {
    match &state.db {
        Some(db) => handlers::router(UserService::new(PgUserRepository::new(db.clone()))),
        None => handlers::router(UserService::new(state.memory.clone())),
    }
}
