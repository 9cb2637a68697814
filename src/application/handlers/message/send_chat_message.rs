//! SendChatMessageHandler - stores a message and pushes it to the other
//! participants.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::application::connections::{ConnectionSession, FanoutRouter};
use crate::application::events::payloads::SendChatMessagePayload;
use crate::application::events::{ClientEvent, EventHandler, EventResponse, OutboundFrame};
use crate::application::handlers::{require_member, respond, unexpected_event};
use crate::domain::chat::{validate_content, Message};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ChatRepository, MessageRepository};

/// Handler for `SEND_CHAT_MESSAGE`.
///
/// Steps, in order:
/// 1. Check the sender is a member and the content is acceptable
/// 2. Store the message
/// 3. Push it (`op = 2`) to every other participant that is online
/// 4. Mark the chat read for the sender up to the new message
/// 5. Respond to the sender with the stored message
pub struct SendChatMessageHandler {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    fanout: FanoutRouter,
    max_len: usize,
}

impl SendChatMessageHandler {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        fanout: FanoutRouter,
        max_len: usize,
    ) -> Self {
        Self {
            chats,
            messages,
            fanout,
            max_len,
        }
    }

    pub async fn execute(
        &self,
        session: &ConnectionSession,
        payload: &SendChatMessagePayload,
    ) -> Result<Message, DomainError> {
        let sender = session.require_identity().await?;
        validate_content(&payload.content, self.max_len)?;
        let participants = require_member(self.chats.as_ref(), payload.chat_id, sender).await?;

        let message = self
            .messages
            .create(payload.chat_id, sender, &payload.content)
            .await?;
        info!(
            chat_id = %message.chat_id,
            message_id = %message.message_id,
            user_id = %sender,
            "Message stored"
        );

        let frame = OutboundFrame::push(&message).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize message push: {}", e),
            )
        })?;
        let recipients = participants.into_iter().filter(|id| *id != sender);
        let report = self.fanout.fanout(&frame, recipients).await.map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize message push: {}", e),
            )
        })?;
        debug!(
            message_id = %message.message_id,
            delivered = report.delivered.len(),
            offline = report.offline.len(),
            "Message pushed to participants"
        );

        self.messages
            .mark_read(message.chat_id, sender, message.message_id)
            .await?;

        Ok(message)
    }
}

#[async_trait]
impl EventHandler for SendChatMessageHandler {
    async fn handle(
        &self,
        session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError> {
        let ClientEvent::SendChatMessage(payload) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        respond(event.name(), self.execute(session, payload).await)
    }

    fn name(&self) -> &'static str {
        "SendChatMessageHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::ChatId;
    use serde_json::Value;

    fn send(chat_id: ChatId, content: &str) -> ClientEvent {
        ClientEvent::SendChatMessage(SendChatMessagePayload {
            chat_id,
            content: content.to_string(),
        })
    }

    fn handler(fx: &Fixture) -> SendChatMessageHandler {
        SendChatMessageHandler::new(fx.store.clone(), fx.store.clone(), fx.fanout(), 100)
    }

    #[tokio::test]
    async fn pushes_to_recipient_and_responds_to_sender() {
        let fx = Fixture::new();
        let alice = fx.user("alice", "Alice").await;
        let bob = fx.user("bob", "Bob").await;
        let chat = fx.chat(&alice, &bob).await;
        let (alice_session, alice_conn) = fx.session_for(&alice).await;
        let (_bob_session, bob_conn) = fx.session_for(&bob).await;

        let response = handler(&fx)
            .handle(&alice_session, &send(chat.chat_id, "hi"))
            .await
            .unwrap()
            .unwrap();

        assert!(response.success);
        assert_eq!(response.data.as_ref().unwrap()["content"], "hi");

        let pushed: Vec<Value> = bob_conn.json_frames();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0]["op"], 2);
        assert_eq!(pushed[0]["data"]["content"], "hi");
        assert_eq!(pushed[0]["data"]["author_id"], alice.user_id.as_i64());

        // The handler never writes to the sender directly.
        assert!(alice_conn.frames().is_empty());
    }

    #[tokio::test]
    async fn sender_has_read_own_message() {
        let fx = Fixture::new();
        let alice = fx.user("alice", "Alice").await;
        let bob = fx.user("bob", "Bob").await;
        let chat = fx.chat(&alice, &bob).await;
        let (session, _) = fx.session_for(&alice).await;

        handler(&fx)
            .handle(&session, &send(chat.chat_id, "hi"))
            .await
            .unwrap();

        let marker = fx.store.read_marker(chat.chat_id, alice.user_id).await.unwrap();
        let latest = fx.store.latest_id(chat.chat_id).await.unwrap();
        assert_eq!(marker, latest);
        assert_eq!(
            fx.store.read_marker(chat.chat_id, bob.user_id).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn offline_recipient_is_skipped() {
        let fx = Fixture::new();
        let alice = fx.user("alice", "Alice").await;
        let bob = fx.user("bob", "Bob").await;
        let chat = fx.chat(&alice, &bob).await;
        let (session, _) = fx.session_for(&alice).await;

        let response = handler(&fx)
            .handle(&session, &send(chat.chat_id, "anyone there?"))
            .await
            .unwrap()
            .unwrap();

        assert!(response.success);
        assert_eq!(fx.store.message_count().await, 1);
    }

    #[tokio::test]
    async fn non_member_cannot_send() {
        let fx = Fixture::new();
        let alice = fx.user("alice", "Alice").await;
        let bob = fx.user("bob", "Bob").await;
        let eve = fx.user("eve", "Eve").await;
        let chat = fx.chat(&alice, &bob).await;
        let (session, _) = fx.session_for(&eve).await;

        let response = handler(&fx)
            .handle(&session, &send(chat.chat_id, "let me in"))
            .await
            .unwrap()
            .unwrap();

        assert!(!response.success);
        assert_eq!(fx.store.message_count().await, 0);
    }

    #[tokio::test]
    async fn empty_and_overlong_content_are_refused() {
        let fx = Fixture::new();
        let alice = fx.user("alice", "Alice").await;
        let bob = fx.user("bob", "Bob").await;
        let chat = fx.chat(&alice, &bob).await;
        let (session, _) = fx.session_for(&alice).await;

        for content in ["   ".to_string(), "x".repeat(101)] {
            let response = handler(&fx)
                .handle(&session, &send(chat.chat_id, &content))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(response.data.unwrap()["code"], "VALIDATION_FAILED");
        }
        assert_eq!(fx.store.message_count().await, 0);
    }
}
