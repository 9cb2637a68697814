//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::{NewUser, User, UserTag};
use crate::ports::UserRepository;

use super::{corrupt_row, read_error, write_error};

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (firebase_id, user_tag, user_name)
            VALUES ($1, $2, $3)
            RETURNING user_id
            "#,
        )
        .bind(&user.firebase_id)
        .bind(user.user_tag.as_str())
        .bind(&user.user_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("Failed to insert user", e))?;

        let user_id: i64 = row
            .try_get("user_id")
            .map_err(|e| read_error("Failed to read user id", e))?;

        Ok(user.into_user(UserId::new(user_id)))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT user_id, firebase_id, user_tag, user_name FROM users WHERE user_id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch user", e))?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_firebase_id(&self, firebase_id: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT user_id, firebase_id, user_tag, user_name FROM users WHERE firebase_id = $1",
        )
        .bind(firebase_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch user by firebase id", e))?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT user_id, firebase_id, user_tag, user_name FROM users WHERE user_tag = $1",
        )
        .bind(tag)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch user by tag", e))?;

        row.map(row_to_user).transpose()
    }

    async fn update(&self, user: &User) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                firebase_id = $2,
                user_tag = $3,
                user_name = $4
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_i64())
        .bind(&user.firebase_id)
        .bind(user.user_tag.as_str())
        .bind(&user.user_name)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tracing::debug!(user_id = %user.user_id, "User update hit a uniqueness constraint");
                Ok(false)
            }
            Err(e) => Err(write_error("Failed to update user", e)),
        }
    }
}

fn row_to_user(row: PgRow) -> Result<User, DomainError> {
    let read = |e| read_error("Failed to decode user row", e);

    let user_id: i64 = row.try_get("user_id").map_err(read)?;
    let firebase_id: String = row.try_get("firebase_id").map_err(read)?;
    let user_tag: String = row.try_get("user_tag").map_err(read)?;
    let user_name: String = row.try_get("user_name").map_err(read)?;

    let user_tag = UserTag::new(user_tag).map_err(|e| corrupt_row("Stored user tag", e))?;

    Ok(User {
        user_id: UserId::new(user_id),
        firebase_id,
        user_tag,
        user_name,
    })
}
