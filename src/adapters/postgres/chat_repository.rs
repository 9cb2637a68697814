//! PostgreSQL implementation of ChatRepository.
//!
//! Chat list summaries are computed in a single query per user: the display
//! name, unread count and last message come from correlated subqueries over
//! `chats_users` and `messages`. Chat creation takes a transaction-scoped
//! advisory lock on the participant set, so two creators of the same chat
//! cannot both pass the existence check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, PgPool, Row};

use crate::domain::chat::{Chat, ChatSummary, Participants, PREVIEW_LEN};
use crate::domain::foundation::{ChatId, DomainError, MessageId, Timestamp, UserId};
use crate::ports::ChatRepository;

use super::{read_error, write_error};

/// PostgreSQL implementation of ChatRepository.
#[derive(Clone)]
pub struct PostgresChatRepository {
    pool: PgPool,
}

impl PostgresChatRepository {
    /// Creates a new PostgresChatRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PostgresChatRepository {
    async fn create(&self, participants: &Participants) -> Result<Chat, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| read_error("Failed to begin chat transaction", e))?;

        // Serializes creators of the same participant set until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(participant_key(participants))
            .execute(&mut *tx)
            .await
            .map_err(|e| read_error("Failed to lock participant set", e))?;

        if find_chat(&mut *tx, participants).await?.is_some() {
            return Err(DomainError::conflict("A chat between these users already exists"));
        }

        let row = sqlx::query("INSERT INTO chats DEFAULT VALUES RETURNING chat_id, creation_time")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| write_error("Failed to insert chat", e))?;
        let chat = row_to_chat(&row)?;

        for user_id in participants.ids() {
            sqlx::query("INSERT INTO chats_users (chat_id, user_id) VALUES ($1, $2)")
                .bind(chat.chat_id.as_i64())
                .bind(user_id.as_i64())
                .execute(&mut *tx)
                .await
                .map_err(|e| write_error("Failed to insert chat member", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| write_error("Failed to commit chat", e))?;

        Ok(chat)
    }

    async fn find_by_participants(
        &self,
        participants: &Participants,
    ) -> Result<Option<Chat>, DomainError> {
        find_chat(&self.pool, participants).await
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ChatSummary>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT c.chat_id, c.creation_time,
                   COALESCE((
                       SELECT string_agg(u.user_name, ', ' ORDER BY u.user_name)
                       FROM chats_users other
                       JOIN users u ON u.user_id = other.user_id
                       WHERE other.chat_id = c.chat_id AND other.user_id <> $1
                   ), '') AS name,
                   (
                       SELECT COUNT(*)
                       FROM messages m
                       WHERE m.chat_id = c.chat_id
                         AND m.author_id <> $1
                         AND m.message_id > COALESCE(me.last_read_message_id, 0)
                   ) AS unreads,
                   last.message_id AS last_message,
                   LEFT(last.content, $2) AS last_msg_preview,
                   last.created_at AS time_last_msg
            FROM chats_users me
            JOIN chats c ON c.chat_id = me.chat_id
            LEFT JOIN LATERAL (
                SELECT message_id, content, created_at
                FROM messages
                WHERE chat_id = c.chat_id
                ORDER BY message_id DESC
                LIMIT 1
            ) last ON TRUE
            WHERE me.user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .bind(PREVIEW_LEN as i32)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch chats for user", e))?;

        rows.iter().map(row_to_summary).collect()
    }

    async fn participants(&self, chat_id: ChatId) -> Result<Vec<UserId>, DomainError> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT user_id FROM chats_users WHERE chat_id = $1 ORDER BY user_id")
                .bind(chat_id.as_i64())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| read_error("Failed to fetch chat participants", e))?;

        Ok(rows.into_iter().map(|(id,)| UserId::new(id)).collect())
    }
}

/// Advisory lock key for a participant set, e.g. `chat:1,2`.
fn participant_key(participants: &Participants) -> String {
    let ids: Vec<String> = participants.ids().iter().map(ToString::to_string).collect();
    format!("chat:{}", ids.join(","))
}

async fn find_chat<'e, E>(
    executor: E,
    participants: &Participants,
) -> Result<Option<Chat>, DomainError>
where
    E: PgExecutor<'e>,
{
    let ids: Vec<i64> = participants.ids().iter().map(UserId::as_i64).collect();
    let first = ids[0];

    let row = sqlx::query(
        r#"
        SELECT c.chat_id, c.creation_time
        FROM chats c
        JOIN chats_users cu ON cu.chat_id = c.chat_id
        WHERE c.chat_id IN (SELECT chat_id FROM chats_users WHERE user_id = $2)
        GROUP BY c.chat_id, c.creation_time
        HAVING array_agg(cu.user_id ORDER BY cu.user_id) = $1
        ORDER BY c.chat_id
        LIMIT 1
        "#,
    )
    .bind(ids.as_slice())
    .bind(first)
    .fetch_optional(executor)
    .await
    .map_err(|e| read_error("Failed to fetch chat by participants", e))?;

    row.as_ref().map(row_to_chat).transpose()
}

fn row_to_chat(row: &PgRow) -> Result<Chat, DomainError> {
    let read = |e| read_error("Failed to decode chat row", e);

    let chat_id: i64 = row.try_get("chat_id").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("creation_time").map_err(read)?;

    Ok(Chat {
        chat_id: ChatId::new(chat_id),
        created_at: Timestamp::from_datetime(created_at),
    })
}

fn row_to_summary(row: &PgRow) -> Result<ChatSummary, DomainError> {
    let read = |e| read_error("Failed to decode chat summary row", e);

    let chat = row_to_chat(row)?;
    let name: String = row.try_get("name").map_err(read)?;
    let unreads: i64 = row.try_get("unreads").map_err(read)?;
    let last_message: Option<i64> = row.try_get("last_message").map_err(read)?;
    let last_msg_preview: Option<String> = row.try_get("last_msg_preview").map_err(read)?;
    let time_last_msg: Option<DateTime<Utc>> = row.try_get("time_last_msg").map_err(read)?;

    Ok(ChatSummary {
        chat_id: chat.chat_id,
        name,
        unreads,
        last_message: last_message.map(MessageId::new),
        last_msg_preview,
        time_last_msg: time_last_msg.map(Timestamp::from_datetime),
        created_at: chat.created_at,
    })
}
