//! LoadUserChatsHandler - the logged-in user's chat list.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::connections::ConnectionSession;
use crate::application::events::{ClientEvent, EventHandler, EventResponse};
use crate::application::handlers::{require_same_user, respond, unexpected_event};
use crate::domain::chat::{sort_by_recent_activity, ChatSummary};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::ChatRepository;

/// Response body for `LOAD_USER_CHATS`.
#[derive(Debug, Clone, Serialize)]
pub struct UserChats {
    pub chats: Vec<ChatSummary>,
}

/// Handler for `LOAD_USER_CHATS`; most recently active chat first.
pub struct LoadUserChatsHandler {
    chats: Arc<dyn ChatRepository>,
}

impl LoadUserChatsHandler {
    pub fn new(chats: Arc<dyn ChatRepository>) -> Self {
        Self { chats }
    }

    pub async fn execute(
        &self,
        session: &ConnectionSession,
        user_id: UserId,
    ) -> Result<UserChats, DomainError> {
        let identity = session.require_identity().await?;
        require_same_user(identity, user_id)?;

        let mut chats = self.chats.list_for_user(identity).await?;
        sort_by_recent_activity(&mut chats);
        Ok(UserChats { chats })
    }
}

#[async_trait]
impl EventHandler for LoadUserChatsHandler {
    async fn handle(
        &self,
        session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError> {
        let ClientEvent::LoadUserChats(payload) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        respond(event.name(), self.execute(session, payload.user_id).await)
    }

    fn name(&self) -> &'static str {
        "LoadUserChatsHandler"
    }
}
