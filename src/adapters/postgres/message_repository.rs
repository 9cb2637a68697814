//! PostgreSQL implementation of MessageRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::chat::Message;
use crate::domain::foundation::{ChatId, DomainError, MessageId, Timestamp, UserId};
use crate::ports::MessageRepository;

use super::{read_error, write_error};

/// PostgreSQL implementation of MessageRepository.
#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    /// Creates a new PostgresMessageRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn create(
        &self,
        chat_id: ChatId,
        author_id: UserId,
        content: &str,
    ) -> Result<Message, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO messages (chat_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING message_id, chat_id, author_id, content, created_at
            "#,
        )
        .bind(chat_id.as_i64())
        .bind(author_id.as_i64())
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("Failed to insert message", e))?;

        row_to_message(&row)
    }

    async fn list(&self, chat_id: ChatId) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT message_id, chat_id, author_id, content, created_at
            FROM messages
            WHERE chat_id = $1
            ORDER BY message_id DESC
            "#,
        )
        .bind(chat_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch messages", e))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn latest_id(&self, chat_id: ChatId) -> Result<Option<MessageId>, DomainError> {
        let result: (Option<i64>,) =
            sqlx::query_as("SELECT MAX(message_id) FROM messages WHERE chat_id = $1")
                .bind(chat_id.as_i64())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| read_error("Failed to fetch latest message id", e))?;

        Ok(result.0.map(MessageId::new))
    }

    async fn mark_read(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        up_to: MessageId,
    ) -> Result<Option<MessageId>, DomainError> {
        let result: Option<(Option<i64>,)> = sqlx::query_as(
            r#"
            UPDATE chats_users
            SET last_read_message_id = GREATEST(COALESCE(last_read_message_id, 0), $3)
            WHERE chat_id = $1 AND user_id = $2
            RETURNING last_read_message_id
            "#,
        )
        .bind(chat_id.as_i64())
        .bind(user_id.as_i64())
        .bind(up_to.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("Failed to update read marker", e))?;

        Ok(result.and_then(|(id,)| id).map(MessageId::new))
    }

    async fn read_marker(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<Option<MessageId>, DomainError> {
        let result: Option<(Option<i64>,)> = sqlx::query_as(
            "SELECT last_read_message_id FROM chats_users WHERE chat_id = $1 AND user_id = $2",
        )
        .bind(chat_id.as_i64())
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch read marker", e))?;

        Ok(result.and_then(|(id,)| id).map(MessageId::new))
    }
}

fn row_to_message(row: &PgRow) -> Result<Message, DomainError> {
    let read = |e| read_error("Failed to decode message row", e);

    let message_id: i64 = row.try_get("message_id").map_err(read)?;
    let chat_id: i64 = row.try_get("chat_id").map_err(read)?;
    let author_id: i64 = row.try_get("author_id").map_err(read)?;
    let content: String = row.try_get("content").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;

    Ok(Message {
        message_id: MessageId::new(message_id),
        chat_id: ChatId::new(chat_id),
        author_id: UserId::new(author_id),
        content,
        created_at: Timestamp::from_datetime(created_at),
    })
}
