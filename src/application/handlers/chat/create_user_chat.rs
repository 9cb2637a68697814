//! CreateUserChatHandler - opens a chat with another user by tag.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::application::connections::ConnectionSession;
use crate::application::events::payloads::CreateUserChatPayload;
use crate::application::events::{ClientEvent, EventHandler, EventResponse};
use crate::application::handlers::{require_same_user, respond, unexpected_event};
use crate::domain::chat::{ChatSummary, Participants};
use crate::domain::foundation::DomainError;
use crate::domain::user::is_valid_tag;
use crate::ports::{ChatRepository, UserRepository};

/// Handler for `CREATE_USER_CHAT`.
///
/// Fails without creating anything when the tag is malformed or unknown,
/// when the recipient is the requester, or when the two already share a
/// chat.
pub struct CreateUserChatHandler {
    users: Arc<dyn UserRepository>,
    chats: Arc<dyn ChatRepository>,
}

impl CreateUserChatHandler {
    pub fn new(users: Arc<dyn UserRepository>, chats: Arc<dyn ChatRepository>) -> Self {
        Self { users, chats }
    }

    pub async fn execute(
        &self,
        session: &ConnectionSession,
        payload: &CreateUserChatPayload,
    ) -> Result<ChatSummary, DomainError> {
        let identity = session.require_identity().await?;
        require_same_user(identity, payload.orig_user_id)?;

        if !is_valid_tag(&payload.recv_user_tag) {
            return Err(DomainError::validation(
                "recv_user_tag",
                format!("'{}' is not a valid user tag", payload.recv_user_tag),
            ));
        }
        let recipient = self
            .users
            .find_by_tag(&payload.recv_user_tag)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("No user tagged '{}'", payload.recv_user_tag))
            })?;

        let participants = Participants::new([identity, recipient.user_id])?;
        // `create` repeats this check atomically.
        if self.chats.find_by_participants(&participants).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "A chat with '{}' already exists",
                payload.recv_user_tag
            )));
        }

        let chat = self.chats.create(&participants).await?;
        info!(
            chat_id = %chat.chat_id,
            user_id = %identity,
            recipient_id = %recipient.user_id,
            "Chat created"
        );

        Ok(ChatSummary {
            chat_id: chat.chat_id,
            name: recipient.user_name,
            unreads: 0,
            last_message: None,
            last_msg_preview: None,
            time_last_msg: None,
            created_at: chat.created_at,
        })
    }
}

#[async_trait]
impl EventHandler for CreateUserChatHandler {
    async fn handle(
        &self,
        session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError> {
        let ClientEvent::CreateUserChat(payload) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        respond(event.name(), self.execute(session, payload).await)
    }

    fn name(&self) -> &'static str {
        "CreateUserChatHandler"
    }
}
