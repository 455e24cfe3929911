use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    IdPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, NotFoundResponse,
        ServiceUnavailableResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::{
    error::{MutationError, UserResult},
    models::{
        CountResponse, CreateUser, Direction, ListQuery, MessageResponse, Page, PageQuery,
        SortField, UpdateUser, User,
    },
    repository::UserRepository,
    service::UserService,
};

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        create_user,
        page_users,
        count_users,
        get_user_by_email,
        get_user,
        update_user,
        delete_user,
    ),
    components(
        schemas(
            User,
            CreateUser,
            UpdateUser,
            SortField,
            Direction,
            CountResponse,
            MessageResponse
        ),
        responses(
            BadRequestResponse,
            BadRequestValidationResponse,
            NotFoundResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = "users", description = "User management endpoints")
    )
)]
pub struct ApiDoc;

/// Create Axum router for user endpoints
pub fn router<R>(service: UserService<R>) -> Router
where
    R: UserRepository + 'static,
{
    let service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/page", get(page_users))
        .route("/count", get(count_users))
        .route("/email/{email}", get(get_user_by_email))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(service)
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = "users",
    params(ListQuery),
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 400, response = BadRequestResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_users<R>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> UserResult<Json<Vec<User>>>
where
    R: UserRepository,
{
    let users = service.list_users(query.to_sort()).await?;
    Ok(Json(users))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_user<R>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> Result<impl IntoResponse, MutationError>
where
    R: UserRepository,
{
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List users one page at a time
#[utoipa::path(
    get,
    path = "/page",
    tag = "users",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of users", body = Page<User>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn page_users<R>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> UserResult<Json<Page<User>>>
where
    R: UserRepository,
{
    let page = service.page_users(query.into()).await?;
    Ok(Json(page))
}

/// Count stored users
#[utoipa::path(
    get,
    path = "/count",
    tag = "users",
    responses(
        (status = 200, description = "Number of users", body = CountResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn count_users<R>(
    State(service): State<Arc<UserService<R>>>,
) -> UserResult<Json<CountResponse>>
where
    R: UserRepository,
{
    let count = service.count_users().await?;
    Ok(Json(CountResponse { count }))
}

/// Get a user by email
#[utoipa::path(
    get,
    path = "/email/{email}",
    tag = "users",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, response = NotFoundResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn get_user_by_email<R>(
    State(service): State<Arc<UserService<R>>>,
    Path(email): Path<String>,
) -> UserResult<Json<User>>
where
    R: UserRepository,
{
    let user = service.get_user_by_email(&email).await?;
    Ok(Json(user))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn get_user<R>(
    State(service): State<Arc<UserService<R>>>,
    IdPath(id): IdPath,
) -> UserResult<Json<User>>
where
    R: UserRepository,
{
    let user = service.get_user(id).await?;
    Ok(Json(user))
}

/// Replace a user's email and name
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated successfully", body = User),
        (status = 400, response = BadRequestResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn update_user<R>(
    State(service): State<Arc<UserService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> Result<Json<User>, MutationError>
where
    R: UserRepository,
{
    let user = service.update_user(id, input).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = MessageResponse),
        (status = 400, response = BadRequestResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn delete_user<R>(
    State(service): State<Arc<UserService<R>>>,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, MutationError>
where
    R: UserRepository,
{
    service.delete_user(id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
