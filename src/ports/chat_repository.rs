//! Chat repository port.

use async_trait::async_trait;

use crate::domain::chat::{Chat, ChatSummary, Participants};
use crate::domain::foundation::{ChatId, DomainError, UserId};

/// Repository port for chats and chat membership.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Create a chat with the given participants.
    ///
    /// The chat row and every membership row are written atomically: on
    /// failure no part of the chat is visible. At most one chat exists per
    /// participant set, even under concurrent calls.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a chat with exactly these participants exists
    /// - `NotFound` if a participant is not a registered user
    /// - `DatabaseError` on persistence failure
    async fn create(&self, participants: &Participants) -> Result<Chat, DomainError>;

    /// Find the chat whose participant set is exactly `participants`.
    async fn find_by_participants(
        &self,
        participants: &Participants,
    ) -> Result<Option<Chat>, DomainError>;

    /// List the chat summaries visible to `user_id`.
    ///
    /// Ordering is not guaranteed; callers sort.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ChatSummary>, DomainError>;

    /// Return the participant ids of a chat (empty if the chat is unknown).
    async fn participants(&self, chat_id: ChatId) -> Result<Vec<UserId>, DomainError>;
}
