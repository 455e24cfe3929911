//! Integration tests for Users domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Gateway queries work against the migrated schema
//! - The unique email index is enforced
//! - Ordering and paging are applied by the database

use domain_users::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
async fn test_save_assigns_id_and_find_returns_equal_record() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("save_and_find");

    let saved = repo
        .save(User::new(builder.email("main"), builder.name("user", "main")))
        .await
        .unwrap();

    let id = assert_some(saved.id, "saved user id");
    let found = assert_some(repo.find_by_id(id).await.unwrap(), "user should exist");

    assert_eq!(found.id, saved.id);
    assert_eq!(found.email, saved.email);
    assert_eq!(found.name, saved.name);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("duplicate_email");
    let email = builder.email("dup");

    repo.save(User::new(email.clone(), "First")).await.unwrap();

    let result = repo.save(User::new(email, "Second")).await;
    assert!(
        matches!(result, Err(UserError::Conflict(_))),
        "Expected Conflict error, got {:?}",
        result
    );
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_email_match_is_case_sensitive() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    repo.save(User::new("a@x.com", "Lower")).await.unwrap();

    assert!(repo.exists_by_email("a@x.com").await.unwrap());
    assert!(!repo.exists_by_email("A@X.COM").await.unwrap());
}

#[tokio::test]
async fn test_exists_by_email_follows_lifecycle() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("exists_lifecycle");
    let email = builder.email("life");

    assert!(!repo.exists_by_email(&email).await.unwrap());

    let saved = repo.save(User::new(email.clone(), "Life")).await.unwrap();
    assert!(repo.exists_by_email(&email).await.unwrap());

    repo.delete(saved).await.unwrap();
    assert!(!repo.exists_by_email(&email).await.unwrap());
}

#[tokio::test]
async fn test_delete_by_id_is_idempotent() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let id = repo
        .save(User::new("gone@x.com", "Gone"))
        .await
        .unwrap()
        .id
        .unwrap();

    repo.delete_by_id(id).await.unwrap();
    repo.delete_by_id(id).await.unwrap();

    assert_none(repo.find_by_id(id).await.unwrap(), "deleted user");
    assert!(!repo.exists_by_id(id).await.unwrap());
}

#[tokio::test]
async fn test_save_with_id_replaces_record() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let mut user = repo.save(User::new("old@x.com", "Old")).await.unwrap();
    user.email = "new@x.com".to_string();
    user.name = "New".to_string();

    let updated = repo.save(user.clone()).await.unwrap();

    assert_eq!(updated.id, user.id);
    assert_eq!(repo.count().await.unwrap(), 1);
    assert_none(repo.find_by_email("old@x.com").await.unwrap(), "old email");
    assert_some(repo.find_by_email("new@x.com").await.unwrap(), "new email");
}

#[tokio::test]
async fn test_save_with_unknown_id_inserts_and_advances_sequence() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let explicit = repo
        .save(User::new("a@x.com", "A").with_id(1))
        .await
        .unwrap();
    let next = repo.save(User::new("b@x.com", "B")).await.unwrap();

    assert_eq!(explicit.id, Some(1));
    assert!(next.id.unwrap() > 1);
    assert_eq!(repo.count().await.unwrap(), 2);

    repo.save(User::new("c@x.com", "C").with_id(50))
        .await
        .unwrap();
    let after = repo.save(User::new("d@x.com", "D")).await.unwrap();
    assert_eq!(after.id, Some(51));
}

#[tokio::test]
async fn test_update_after_delete_does_not_recreate() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let mut user = repo.save(User::new("a@x.com", "A")).await.unwrap();
    repo.delete(user.clone()).await.unwrap();

    user.name = "Renamed".to_string();
    let result = repo.update(user).await;

    assert!(
        matches!(result, Err(UserError::NotFound(_))),
        "Expected NotFound error, got {:?}",
        result
    );
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_to_taken_email_is_conflict() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    repo.save(User::new("a@x.com", "A")).await.unwrap();
    let mut b = repo.save(User::new("b@x.com", "B")).await.unwrap();

    b.email = "a@x.com".to_string();
    let result = repo.update(b).await;

    assert!(matches!(result, Err(UserError::Conflict(email)) if email == "a@x.com"));
}

#[tokio::test]
async fn test_find_all_sorted_and_paged() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    repo.save_all(vec![
        User::new("c@x.com", "Carol"),
        User::new("a@x.com", "Alice"),
        User::new("b@x.com", "Bob"),
    ])
    .await
    .unwrap();

    let all = repo.find_all().await.unwrap();
    let ids: Vec<i64> = all.iter().filter_map(|u| u.id).collect();
    assert_eq!(ids.len(), 3);
    assert_ascending(&ids, "find_all");

    let by_name = repo
        .find_all_sorted(Sort::by(SortField::Name))
        .await
        .unwrap();
    let names: Vec<&str> = by_name.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);

    let page = repo
        .find_page(PageRequest::of(1, 2).with_sort(Sort::by(SortField::Email).descending()))
        .await
        .unwrap();
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].email, "a@x.com");
}

#[tokio::test]
async fn test_batch_deletes() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let saved = repo
        .save_all(vec![
            User::new("one@x.com", "One"),
            User::new("two@x.com", "Two"),
            User::new("three@x.com", "Three"),
        ])
        .await
        .unwrap();
    let ids: Vec<i64> = saved.iter().filter_map(|u| u.id).collect();

    repo.delete_all_by_id_in_batch(ids[..2].to_vec())
        .await
        .unwrap();
    assert_eq!(repo.count().await.unwrap(), 1);

    repo.delete_all_in_batch().await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_all_and_flush() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    repo.save_and_flush(User::new("x@x.com", "X")).await.unwrap();
    repo.save(User::new("y@x.com", "Y")).await.unwrap();

    repo.delete_all().await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 0);
}

// ============================================================================
// Service Tests
// ============================================================================

#[tokio::test]
async fn test_service_update_unknown_id_creates_nothing() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let result = service
        .update_user(
            9999,
            UpdateUser {
                email: "ghost@x.com".to_string(),
                name: "Ghost".to_string(),
            },
        )
        .await;

    assert!(matches!(result, Err(UserError::NotFound(9999))));
    assert_eq!(service.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn test_service_ids_are_not_reused() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let first = service
        .create_user(CreateUser {
            email: "first@x.com".to_string(),
            name: "First".to_string(),
        })
        .await
        .unwrap();
    service.delete_user(first.id.unwrap()).await.unwrap();

    let second = service
        .create_user(CreateUser {
            email: "second@x.com".to_string(),
            name: "Second".to_string(),
        })
        .await
        .unwrap();

    assert!(second.id.unwrap() > first.id.unwrap());
}
