//! Handler tests for Users domain
//!
//! These tests drive the users router over the in-memory store and verify:
//! - Request deserialization and validation
//! - Response serialization
//! - HTTP status codes for every error kind
//!
//! The router is tested on its own, mounted at `/`, without the app's
//! `/api/users` prefix or middleware.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::ErrorResponse;
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

fn app() -> (Router, InMemoryUserRepository) {
    let repo = InMemoryUserRepository::new();
    let router = handlers::router(UserService::new(repo.clone()));
    (router, repo)
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create(app: &Router, email: &str, name: &str) -> User {
    let response = app
        .clone()
        .oneshot(post_json("/", json!({ "email": email, "name": name })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_returns_201_with_assigned_id() {
    let (app, _) = app();

    let response = app
        .clone()
        .oneshot(post_json("/", json!({ "email": "a@x.com", "name": "A" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = json_body(response.into_body()).await;
    assert!(body["id"].is_i64());
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["name"], "A");
}

#[tokio::test]
async fn test_get_returns_created_record() {
    let (app, _) = app();
    let created = create(&app, "a@x.com", "A").await;
    let id = created.id.unwrap();

    let response = app.oneshot(get(&format!("/{}", id))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fetched: User = json_body(response.into_body()).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_duplicate_email_returns_400_with_message() {
    let (app, repo) = app();
    create(&app, "a@x.com", "A").await;

    let response = app
        .oneshot(post_json("/", json!({ "email": "a@x.com", "name": "B" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "Email already exists: a@x.com");
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_update_unknown_id_returns_400_and_creates_nothing() {
    let (app, repo) = app();

    let response = app
        .oneshot(put_json(
            "/9999",
            json!({ "email": "ghost@x.com", "name": "Ghost" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "User not found with id: 9999");
    assert_eq!(repo.count().await.unwrap(), 0);
    assert!(!repo.exists_by_id(9999).await.unwrap());
}

#[tokio::test]
async fn test_delete_then_get_returns_404() {
    let (app, _) = app();
    let id = create(&app, "a@x.com", "A").await.id.unwrap();

    let response = app
        .clone()
        .oneshot(delete(&format!("/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: MessageResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "User deleted successfully");

    let response = app.oneshot(get(&format!("/{}", id))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_id_returns_400() {
    let (app, _) = app();

    let response = app.oneshot(delete("/42")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "User not found with id: 42");
}

#[tokio::test]
async fn test_get_unknown_id_and_email_return_404() {
    let (app, _) = app();

    let response = app.clone().oneshot(get("/12345")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/email/nobody@x.com")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.error, "NOT_FOUND");
}

#[tokio::test]
async fn test_get_by_email() {
    let (app, _) = app();
    let created = create(&app, "a@x.com", "A").await;

    let response = app.oneshot(get("/email/a@x.com")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fetched: User = json_body(response.into_body()).await;
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
async fn test_non_numeric_id_returns_400() {
    let (app, _) = app();

    let response = app.oneshot(get("/abc")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_validates_input() {
    let (app, repo) = app();

    let response = app
        .clone()
        .oneshot(post_json("/", json!({ "email": "not-an-email", "name": "A" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.error, "VALIDATION_ERROR");
    assert!(body.details.unwrap().get("email").is_some());

    let response = app
        .oneshot(post_json("/", json!({ "email": "a@x.com", "name": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_rejects_missing_field() {
    let (app, _) = app();

    let response = app
        .oneshot(post_json("/", json!({ "email": "a@x.com" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_replaces_fields() {
    let (app, _) = app();
    let created = create(&app, "a@x.com", "A").await;
    let id = created.id.unwrap();

    let response = app
        .clone()
        .oneshot(put_json(
            &format!("/{}", id),
            json!({ "email": "b@x.com", "name": "B" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated: User = json_body(response.into_body()).await;
    assert_eq!(updated.id, Some(id));
    assert_eq!(updated.email, "b@x.com");
    assert_eq!(updated.created_at, created.created_at);

    let response = app.oneshot(get("/email/a@x.com")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_to_taken_email_returns_400() {
    let (app, _) = app();
    create(&app, "a@x.com", "A").await;
    let b = create(&app, "b@x.com", "B").await;

    let response = app
        .oneshot(put_json(
            &format!("/{}", b.id.unwrap()),
            json!({ "email": "a@x.com", "name": "B" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_count_and_sort() {
    let (app, _) = app();
    create(&app, "c@x.com", "Carol").await;
    create(&app, "a@x.com", "Alice").await;
    create(&app, "b@x.com", "Bob").await;

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let users: Vec<User> = json_body(response.into_body()).await;
    let ids: Vec<i64> = users.iter().filter_map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let response = app
        .clone()
        .oneshot(get("/?sort=email&direction=desc"))
        .await
        .unwrap();
    let users: Vec<User> = json_body(response.into_body()).await;
    let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["c@x.com", "b@x.com", "a@x.com"]);

    let response = app.oneshot(get("/count")).await.unwrap();
    let body: CountResponse = json_body(response.into_body()).await;
    assert_eq!(body.count, 3);
}

#[tokio::test]
async fn test_unknown_sort_field_returns_400() {
    let (app, _) = app();

    let response = app.oneshot(get("/?sort=password")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_page_endpoint() {
    let (app, _) = app();
    for i in 0..5 {
        create(&app, &format!("u{}@x.com", i), &format!("User {}", i)).await;
    }

    let response = app
        .clone()
        .oneshot(get("/page?page=1&size=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: Page<User> = json_body(response.into_body()).await;
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.content[0].id, Some(3));

    let response = app.oneshot(get("/page?size=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_page_offset_overflow_returns_400() {
    let (app, _) = app();
    create(&app, "a@x.com", "A").await;

    let response = app
        .oneshot(get("/page?page=18446744073709551615&size=20"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert!(body.message.contains("out of range"));
}
