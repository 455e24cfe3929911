use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{Direction, Page, PageRequest, Sort, SortField, User},
    repository::UserRepository,
};

/// PostgreSQL-backed gateway. Email uniqueness is enforced by the unique
/// index on `users.email`.
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn unavailable(err: DbErr) -> UserError {
    tracing::error!(error = %err, "User store operation failed");
    UserError::Unavailable(err.to_string())
}

/// Postgres' default name for the unique constraint on `users.email`
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Moves the id sequence to the largest stored id, so store-assigned ids
/// never collide with one inserted explicitly.
const SYNC_ID_SEQUENCE: &str =
    "SELECT setval(pg_get_serial_sequence('users', 'id'), (SELECT MAX(id) FROM users))";

fn is_email_violation(message: &str) -> bool {
    message.contains(EMAIL_UNIQUE_CONSTRAINT)
}

fn write_error(err: DbErr, email: &str) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) if is_email_violation(&message) => {
            UserError::Conflict(email.to_string())
        }
        _ => unavailable(err),
    }
}

fn ordered(sort: Option<Sort>) -> Select<entity::Entity> {
    let query = entity::Entity::find();

    let Some(sort) = sort else {
        return query.order_by_asc(entity::Column::Id);
    };

    let column = match sort.field {
        SortField::Id => entity::Column::Id,
        SortField::Email => entity::Column::Email,
        SortField::Name => entity::Column::Name,
        SortField::CreatedAt => entity::Column::CreatedAt,
    };
    let order = match sort.direction {
        Direction::Asc => Order::Asc,
        Direction::Desc => Order::Desc,
    };

    query.order_by(column, order).order_by_asc(entity::Column::Id)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(model.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(model.map(Into::into))
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let count = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .count(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(count > 0)
    }

    async fn exists_by_id(&self, id: i64) -> UserResult<bool> {
        let count = entity::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(count > 0)
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let models = ordered(None).all(&self.db).await.map_err(unavailable)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_all_sorted(&self, sort: Sort) -> UserResult<Vec<User>> {
        let models = ordered(Some(sort))
            .all(&self.db)
            .await
            .map_err(unavailable)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_page(&self, request: PageRequest) -> UserResult<Page<User>> {
        if request.size == 0 {
            return Err(UserError::Validation("page size must be positive".to_string()));
        }

        let paginator = ordered(request.sort).paginate(&self.db, request.size);
        let total = paginator.num_items().await.map_err(unavailable)?;
        let models = paginator
            .fetch_page(request.page)
            .await
            .map_err(unavailable)?;

        let content = models.into_iter().map(Into::into).collect();
        Ok(Page::new(content, &request, total))
    }

    async fn count(&self) -> UserResult<u64> {
        entity::Entity::find()
            .count(&self.db)
            .await
            .map_err(unavailable)
    }

    async fn save(&self, user: User) -> UserResult<User> {
        let email = user.email.clone();
        let existing = match user.id {
            Some(id) => entity::Entity::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(unavailable)?,
            None => None,
        };
        let explicit_insert = user.id.is_some() && existing.is_none();

        let active_model: entity::ActiveModel = user.into();
        let model = match existing {
            Some(_) => active_model.update(&self.db).await,
            None => active_model.insert(&self.db).await,
        }
        .map_err(|e| write_error(e, &email))?;

        if explicit_insert {
            self.db
                .execute_unprepared(SYNC_ID_SEQUENCE)
                .await
                .map_err(unavailable)?;
        }

        tracing::info!(user_id = model.id, "Saved user");
        Ok(model.into())
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let Some(id) = user.id else {
            return Err(UserError::NotFound(0));
        };
        let email = user.email.clone();

        let active_model: entity::ActiveModel = user.into();
        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => UserError::NotFound(id),
                e => write_error(e, &email),
            })?;

        tracing::info!(user_id = model.id, "Updated user");
        Ok(model.into())
    }

    async fn flush(&self) -> UserResult<()> {
        // Every statement is auto-committed.
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> UserResult<()> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(unavailable)?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = id, "Deleted user");
        }
        Ok(())
    }

    async fn delete_all(&self) -> UserResult<()> {
        let ids: Vec<i64> = entity::Entity::find()
            .select_only()
            .column(entity::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(unavailable)?;

        self.delete_all_by_id(ids).await
    }

    async fn delete_all_in_batch(&self) -> UserResult<()> {
        let result = entity::Entity::delete_many()
            .exec(&self.db)
            .await
            .map_err(unavailable)?;

        tracing::info!(rows = result.rows_affected, "Deleted all users");
        Ok(())
    }

    async fn delete_all_by_id_in_batch(&self, ids: Vec<i64>) -> UserResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let result = entity::Entity::delete_many()
            .filter(entity::Column::Id.is_in(ids))
            .exec(&self.db)
            .await
            .map_err(unavailable)?;

        tracing::info!(rows = result.rows_affected, "Deleted users in batch");
        Ok(())
    }
}
