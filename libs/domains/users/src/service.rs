use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, MAX_PAGE_SIZE, Page, PageRequest, Sort, UpdateUser, User};
use crate::repository::UserRepository;

/// Service layer for User business logic
///
/// Owns the rules the gateway does not: input normalisation, the email
/// uniqueness pre-check, and existence checks for update and delete targets.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// All users, in id order unless a sort is given
    pub async fn list_users(&self, sort: Option<Sort>) -> UserResult<Vec<User>> {
        match sort {
            Some(sort) => self.repository.find_all_sorted(sort).await,
            None => self.repository.find_all().await,
        }
    }

    pub async fn page_users(&self, request: PageRequest) -> UserResult<Page<User>> {
        if request.size == 0 || request.size > MAX_PAGE_SIZE {
            return Err(UserError::Validation(format!(
                "page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if request
            .page
            .checked_mul(request.size)
            .is_none_or(|offset| offset > i64::MAX as u64)
        {
            return Err(UserError::Validation(format!(
                "page {} is out of range",
                request.page
            )));
        }

        self.repository.find_page(request).await
    }

    pub async fn count_users(&self) -> UserResult<u64> {
        self.repository.count().await
    }

    pub async fn get_user(&self, id: i64) -> UserResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    pub async fn get_user_by_email(&self, email: &str) -> UserResult<User> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| UserError::EmailNotFound(email.to_string()))
    }

    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        let input = input.normalized();
        ensure_present("name", &input.name)?;
        ensure_present("email", &input.email)?;

        if self.repository.exists_by_email(&input.email).await? {
            return Err(UserError::Conflict(input.email));
        }

        let user = self
            .repository
            .save(User::new(input.email, input.name))
            .await?;

        tracing::info!(user_id = ?user.id, "Created user");
        Ok(user)
    }

    /// Replace a user's email and name. Never creates a record.
    pub async fn update_user(&self, id: i64, input: UpdateUser) -> UserResult<User> {
        let input = input.normalized();
        ensure_present("name", &input.name)?;
        ensure_present("email", &input.email)?;

        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if input.email != user.email {
            if let Some(holder) = self.repository.find_by_email(&input.email).await? {
                if holder.id != Some(id) {
                    return Err(UserError::Conflict(input.email));
                }
            }
        }

        user.apply_update(input);
        let user = self.repository.update(user).await?;

        tracing::info!(user_id = id, "Updated user");
        Ok(user)
    }

    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        if !self.repository.exists_by_id(id).await? {
            return Err(UserError::NotFound(id));
        }

        self.repository.delete_by_id(id).await?;

        tracing::info!(user_id = id, "Deleted user");
        Ok(())
    }
}

fn ensure_present(field: &str, value: &str) -> UserResult<()> {
    if value.is_empty() {
        return Err(UserError::Validation(format!("{} must not be blank", field)));
    }
    Ok(())
}
