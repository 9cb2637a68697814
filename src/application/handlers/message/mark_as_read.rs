//! Read-state handlers.
//!
//! Both handlers move the caller's read marker up to the chat's latest
//! message *at the time of the call*. Markers never move backwards, so
//! repeating either with no new message changes nothing.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::application::connections::ConnectionSession;
use crate::application::events::{ClientEvent, EventHandler, EventResponse};
use crate::application::handlers::{require_member, respond, unexpected_event};
use crate::domain::foundation::{ChatId, DomainError, MessageId, UserId};
use crate::ports::{ChatRepository, MessageRepository};

/// Response body for `MARK_AS_READ`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadState {
    pub chat_id: ChatId,
    pub last_read_message_id: Option<MessageId>,
}

async fn mark_chat_read(
    chats: &dyn ChatRepository,
    messages: &dyn MessageRepository,
    chat_id: ChatId,
    user_id: UserId,
) -> Result<ReadState, DomainError> {
    require_member(chats, chat_id, user_id).await?;

    let last_read_message_id = match messages.latest_id(chat_id).await? {
        Some(latest) => messages.mark_read(chat_id, user_id, latest).await?,
        None => messages.read_marker(chat_id, user_id).await?,
    };
    debug!(
        chat_id = %chat_id,
        user_id = %user_id,
        last_read_message_id = ?last_read_message_id,
        "Chat marked read"
    );
    Ok(ReadState {
        chat_id,
        last_read_message_id,
    })
}

/// Handler for `MARK_AS_READ`.
pub struct MarkAsReadHandler {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl MarkAsReadHandler {
    pub fn new(chats: Arc<dyn ChatRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { chats, messages }
    }

    pub async fn execute(
        &self,
        session: &ConnectionSession,
        chat_id: ChatId,
    ) -> Result<ReadState, DomainError> {
        let identity = session.require_identity().await?;
        mark_chat_read(
            self.chats.as_ref(),
            self.messages.as_ref(),
            chat_id,
            identity,
        )
        .await
    }
}

#[async_trait]
impl EventHandler for MarkAsReadHandler {
    async fn handle(
        &self,
        session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError> {
        let ClientEvent::MarkAsRead(payload) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        respond(event.name(), self.execute(session, payload.chat_id).await)
    }

    fn name(&self) -> &'static str {
        "MarkAsReadHandler"
    }
}

/// Marks a chat read after `LOAD_SINGLE_CHAT`. Sends nothing.
///
/// Business failures (not a member, unknown chat) were already reported by
/// the loading handler and are ignored here.
pub struct MarkChatReadHandler {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl MarkChatReadHandler {
    pub fn new(chats: Arc<dyn ChatRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { chats, messages }
    }
}

#[async_trait]
impl EventHandler for MarkChatReadHandler {
    async fn handle(
        &self,
        session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError> {
        let ClientEvent::LoadSingleChat(payload) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        let identity = session.require_identity().await?;

        match mark_chat_read(
            self.chats.as_ref(),
            self.messages.as_ref(),
            payload.chat_id,
            identity,
        )
        .await
        {
            Ok(_) => Ok(None),
            Err(e) if e.code.is_business() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &'static str {
        "MarkChatReadHandler"
    }
}
