use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found with id: {0}")]
    NotFound(i64),

    #[error("User not found with email: {0}")]
    EmailNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Email already exists: {0}")]
    Conflict(String),

    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, UserError::Unavailable(_))
    }
}

/// Read-path mapping: missing users are 404, store failures 503.
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) | UserError::EmailNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Conflict(_) => AppError::Conflict(err.to_string()),
            UserError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Error of a mutating endpoint (create, update, delete).
///
/// Every rejected mutation is a 400 carrying the error text, including an
/// unknown target id. Only store failures escape as 503.
#[derive(Debug)]
pub struct MutationError(pub UserError);

impl From<UserError> for MutationError {
    fn from(err: UserError) -> Self {
        Self(err)
    }
}

impl From<MutationError> for AppError {
    fn from(MutationError(err): MutationError) -> Self {
        match err {
            UserError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for MutationError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn read_status(err: UserError) -> StatusCode {
        AppError::from(err).status()
    }

    fn mutation_status(err: UserError) -> StatusCode {
        AppError::from(MutationError(err)).status()
    }

    #[test]
    fn test_read_mapping() {
        assert_eq!(read_status(UserError::NotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            read_status(UserError::EmailNotFound("a@x.com".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            read_status(UserError::Unavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_mutation_mapping() {
        assert_eq!(mutation_status(UserError::NotFound(9999)), StatusCode::BAD_REQUEST);
        assert_eq!(
            mutation_status(UserError::Conflict("a@x.com".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            mutation_status(UserError::Validation("blank name".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            mutation_status(UserError::Unavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_mutation_message_is_error_text() {
        match AppError::from(MutationError(UserError::Conflict("a@x.com".into()))) {
            AppError::BadRequest(msg) => assert_eq!(msg, "Email already exists: a@x.com"),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }
}
