//! LoadSingleChatHandler - the messages of one chat.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::connections::ConnectionSession;
use crate::application::events::{ClientEvent, EventHandler, EventResponse};
use crate::application::handlers::{require_member, respond, unexpected_event};
use crate::domain::chat::Message;
use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::{ChatRepository, MessageRepository};

/// Response body for `LOAD_SINGLE_CHAT`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessages {
    pub chat_id: ChatId,
    /// Newest first.
    pub messages: Vec<Message>,
}

/// Handler for `LOAD_SINGLE_CHAT`. Only members may read a chat.
///
/// Registered ahead of `MarkChatReadHandler`, which marks the chat read once
/// the messages have been loaded.
pub struct LoadSingleChatHandler {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl LoadSingleChatHandler {
    pub fn new(chats: Arc<dyn ChatRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { chats, messages }
    }

    pub async fn execute(
        &self,
        session: &ConnectionSession,
        chat_id: ChatId,
    ) -> Result<ChatMessages, DomainError> {
        let identity = session.require_identity().await?;
        require_member(self.chats.as_ref(), chat_id, identity).await?;

        let messages = self.messages.list(chat_id).await?;
        Ok(ChatMessages { chat_id, messages })
    }
}

#[async_trait]
impl EventHandler for LoadSingleChatHandler {
    async fn handle(
        &self,
        session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError> {
        let ClientEvent::LoadSingleChat(payload) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        respond(event.name(), self.execute(session, payload.chat_id).await)
    }

    fn name(&self) -> &'static str {
        "LoadSingleChatHandler"
    }
}
