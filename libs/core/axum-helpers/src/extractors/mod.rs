//! Custom extractors for Axum handlers.
//!
//! All of them reject with [`AppError`](crate::errors::AppError) so every failure
//! carries the standard error body.

pub mod path;
pub mod validated_json;
pub mod validated_query;

pub use path::IdPath;
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
