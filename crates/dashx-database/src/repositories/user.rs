//! User persistence.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use dashx_core::error::AppError;
use dashx_core::result::AppResult;
use dashx_entity::user::{CreateUser, UpdateUser, User};

use super::{db_err, is_unique_violation};

/// Durable store of confirmed users.
///
/// Lookups return [`AppError::user_not_found`] for missing rows so callers
/// can tell them apart from infrastructure failures.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    async fn get(&self, id: Uuid) -> AppResult<User>;

    /// Case-insensitive lookup.
    async fn get_by_email(&self, email: &str) -> AppResult<User>;

    /// Insert a user and return its id. A taken email yields
    /// [`AppError::email_exists`].
    async fn create(&self, user: CreateUser) -> AppResult<Uuid>;

    async fn update(&self, user: UpdateUser) -> AppResult<()>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, is_admin, language, theme FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find user by id"))?
        .ok_or_else(AppError::user_not_found)
    }

    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, is_admin, language, theme \
             FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find user by email"))?
        .ok_or_else(AppError::user_not_found)
    }

    async fn create(&self, user: CreateUser) -> AppResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (name, email, password, is_admin, language, theme) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 'en'), COALESCE($6, 'light')) \
             RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.is_admin)
        .bind(&user.language)
        .bind(&user.theme)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::email_exists()
            } else {
                db_err("Failed to create user")(e)
            }
        })
    }

    async fn update(&self, user: UpdateUser) -> AppResult<()> {
        if user.is_empty() {
            return self.get(user.id).await.map(|_| ());
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut set = qb.separated(", ");
        if let Some(name) = user.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(email) = user.email {
            set.push("email = ").push_bind_unseparated(email);
        }
        if let Some(password) = user.password {
            set.push("password = ").push_bind_unseparated(password);
        }
        if let Some(language) = user.language {
            set.push("language = ").push_bind_unseparated(language);
        }
        if let Some(theme) = user.theme {
            set.push("theme = ").push_bind_unseparated(theme);
        }
        qb.push(" WHERE id = ").push_bind(user.id);

        let result = qb.build().execute(&self.pool).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::email_exists()
            } else {
                db_err("Failed to update user")(e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::user_not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete user"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::user_not_found());
        }
        Ok(())
    }
}
