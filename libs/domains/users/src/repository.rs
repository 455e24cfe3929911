use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{Page, PageRequest, Sort, User};

/// Persistence gateway for users.
///
/// Lookups report a miss as `Ok(None)`/`Ok(false)`, never as an error. Every
/// operation fails with [`UserError::Unavailable`] when the backing store
/// cannot be reached; nothing is retried here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn exists_by_email(&self, email: &str) -> UserResult<bool>;

    async fn exists_by_id(&self, id: i64) -> UserResult<bool>;

    /// Every stored user in ascending id order
    async fn find_all(&self) -> UserResult<Vec<User>>;

    async fn find_all_sorted(&self, sort: Sort) -> UserResult<Vec<User>>;

    /// One page, ordered by `request.sort` or by id
    async fn find_page(&self, request: PageRequest) -> UserResult<Page<User>>;

    async fn count(&self) -> UserResult<u64>;

    /// Insert when `user.id` is `None` (the store assigns the id), otherwise
    /// insert-or-replace the record with that id.
    ///
    /// Fails with [`UserError::Conflict`] if another record holds the email.
    async fn save(&self, user: User) -> UserResult<User>;

    /// Replace the record with `user.id` if it still exists. Never inserts:
    /// a missing (or absent) id fails with [`UserError::NotFound`].
    async fn update(&self, user: User) -> UserResult<User>;

    /// `save` for each element in order. Not atomic: on failure, earlier
    /// elements stay saved.
    async fn save_all(&self, users: Vec<User>) -> UserResult<Vec<User>> {
        let mut saved = Vec::with_capacity(users.len());
        for user in users {
            saved.push(self.save(user).await?);
        }
        Ok(saved)
    }

    async fn save_and_flush(&self, user: User) -> UserResult<User> {
        let saved = self.save(user).await?;
        self.flush().await?;
        Ok(saved)
    }

    /// Make buffered writes visible
    async fn flush(&self) -> UserResult<()>;

    /// Remove the record if present. Idempotent.
    async fn delete_by_id(&self, id: i64) -> UserResult<()>;

    /// Remove the record matching `user.id`; no-op for a never-saved user.
    async fn delete(&self, user: User) -> UserResult<()> {
        match user.id {
            Some(id) => self.delete_by_id(id).await,
            None => Ok(()),
        }
    }

    async fn delete_all_by_id(&self, ids: Vec<i64>) -> UserResult<()> {
        for id in ids {
            self.delete_by_id(id).await?;
        }
        Ok(())
    }

    async fn delete_many(&self, users: Vec<User>) -> UserResult<()> {
        for user in users {
            self.delete(user).await?;
        }
        Ok(())
    }

    async fn delete_all(&self) -> UserResult<()>;

    /// Remove every record in one store operation
    async fn delete_all_in_batch(&self) -> UserResult<()>;

    /// Remove the given ids in one store operation
    async fn delete_all_by_id_in_batch(&self, ids: Vec<i64>) -> UserResult<()>;
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<i64, User>,
    last_id: i64,
}

impl Store {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && u.id != except)
    }

    fn sorted(&self, sort: Option<Sort>) -> Vec<User> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        if let Some(sort) = sort {
            users.sort_by(|a, b| sort.compare(a, b));
        }
        users
    }
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Ids come from a monotonically increasing counter starting at 1 and are
/// never reused. Email uniqueness is checked under the same write lock as
/// the write itself.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.values().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let store = self.store.read().await;
        Ok(store.email_taken(email, None))
    }

    async fn exists_by_id(&self, id: i64) -> UserResult<bool> {
        let store = self.store.read().await;
        Ok(store.users.contains_key(&id))
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let store = self.store.read().await;
        Ok(store.sorted(None))
    }

    async fn find_all_sorted(&self, sort: Sort) -> UserResult<Vec<User>> {
        let store = self.store.read().await;
        Ok(store.sorted(Some(sort)))
    }

    async fn find_page(&self, request: PageRequest) -> UserResult<Page<User>> {
        let store = self.store.read().await;
        let total = store.users.len() as u64;

        let content = store
            .sorted(request.sort)
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.size).unwrap_or(usize::MAX))
            .collect();

        Ok(Page::new(content, &request, total))
    }

    async fn count(&self) -> UserResult<u64> {
        let store = self.store.read().await;
        Ok(store.users.len() as u64)
    }

    async fn save(&self, mut user: User) -> UserResult<User> {
        let mut store = self.store.write().await;

        if store.email_taken(&user.email, user.id) {
            return Err(UserError::Conflict(user.email));
        }

        let id = match user.id {
            Some(id) => {
                store.last_id = store.last_id.max(id);
                id
            }
            None => {
                store.last_id += 1;
                store.last_id
            }
        };
        user.id = Some(id);
        store.users.insert(id, user.clone());

        tracing::debug!(user_id = id, "Saved user");
        Ok(user)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut store = self.store.write().await;

        let Some(id) = user.id.filter(|id| store.users.contains_key(id)) else {
            return Err(UserError::NotFound(user.id.unwrap_or_default()));
        };
        if store.email_taken(&user.email, Some(id)) {
            return Err(UserError::Conflict(user.email));
        }

        store.users.insert(id, user.clone());

        tracing::debug!(user_id = id, "Updated user");
        Ok(user)
    }

    async fn flush(&self) -> UserResult<()> {
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> UserResult<()> {
        let mut store = self.store.write().await;
        if store.users.remove(&id).is_some() {
            tracing::debug!(user_id = id, "Deleted user");
        }
        Ok(())
    }

    async fn delete_all(&self) -> UserResult<()> {
        let mut store = self.store.write().await;
        store.users.clear();
        Ok(())
    }

    async fn delete_all_in_batch(&self) -> UserResult<()> {
        self.delete_all().await
    }

    async fn delete_all_by_id_in_batch(&self, ids: Vec<i64>) -> UserResult<()> {
        let mut store = self.store.write().await;
        for id in ids {
            store.users.remove(&id);
        }
        Ok(())
    }
}
