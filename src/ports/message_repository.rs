//! Message repository port, including per-user read markers.

use async_trait::async_trait;

use crate::domain::chat::Message;
use crate::domain::foundation::{ChatId, DomainError, MessageId, UserId};

/// Repository port for chat messages and read state.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a new message.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the chat does not exist
    /// - `DatabaseError` on persistence failure
    async fn create(
        &self,
        chat_id: ChatId,
        author_id: UserId,
        content: &str,
    ) -> Result<Message, DomainError>;

    /// List a chat's messages, newest first.
    async fn list(&self, chat_id: ChatId) -> Result<Vec<Message>, DomainError>;

    /// Id of the newest message in a chat, if any.
    async fn latest_id(&self, chat_id: ChatId) -> Result<Option<MessageId>, DomainError>;

    /// Advance the user's read marker for a chat to `up_to`.
    ///
    /// The marker never moves backwards: implementations keep the larger of
    /// the stored value and `up_to`. Returns the marker after the update.
    async fn mark_read(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        up_to: MessageId,
    ) -> Result<Option<MessageId>, DomainError>;

    /// Current read marker for a user in a chat.
    async fn read_marker(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<Option<MessageId>, DomainError>;
}
