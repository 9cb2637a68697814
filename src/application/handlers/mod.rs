//! Application handlers.
//!
//! One handler type per business operation. Each handler takes its
//! collaborators as `Arc<dyn Port>` in `new`, does its work in a typed
//! `execute` method, and implements [`EventHandler`] to plug into the
//! dispatcher.
//!
//! Handlers are registered explicitly by [`register_handlers`]; the order of
//! registration for an event is the order its handlers run in.

pub mod account;
pub mod chat;
pub mod message;

use std::sync::Arc;

use serde::Serialize;

use crate::application::connections::FanoutRouter;
use crate::application::events::payloads::{
    CREATE_USER, CREATE_USER_CHAT, LOAD_SINGLE_CHAT, LOAD_USER_CHATS, LOGIN_USER, MARK_AS_READ,
    SEND_CHAT_MESSAGE, UPDATE_DETAILS,
};
use crate::application::events::{ClientEvent, EventRegistry, EventResponse};
use crate::domain::foundation::{ChatId, DomainError, ErrorCode, UserId};
use crate::ports::{ChatRepository, MessageRepository, UserRepository};

pub use account::{BindSessionHandler, CreateUserHandler, LoginUserHandler, UpdateDetailsHandler};
pub use chat::{CreateUserChatHandler, LoadSingleChatHandler, LoadUserChatsHandler};
pub use message::{MarkAsReadHandler, MarkChatReadHandler, SendChatMessageHandler};

/// Collaborators shared by the handlers.
#[derive(Clone)]
pub struct HandlerDeps {
    pub users: Arc<dyn UserRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub fanout: FanoutRouter,
    /// Longest message content accepted, in characters.
    pub message_max_len: usize,
}

/// Register every handler for every client event.
pub fn register_handlers(registry: &mut EventRegistry, deps: &HandlerDeps) {
    registry.register(
        CREATE_USER,
        Arc::new(CreateUserHandler::new(deps.users.clone())),
    );

    // Bind first so the login response is only sent once the session is live.
    registry.register(
        LOGIN_USER,
        Arc::new(BindSessionHandler::new(deps.users.clone())),
    );
    registry.register(
        LOGIN_USER,
        Arc::new(LoginUserHandler::new(deps.users.clone())),
    );

    registry.register(
        CREATE_USER_CHAT,
        Arc::new(CreateUserChatHandler::new(
            deps.users.clone(),
            deps.chats.clone(),
        )),
    );
    registry.register(
        LOAD_USER_CHATS,
        Arc::new(LoadUserChatsHandler::new(deps.chats.clone())),
    );

    registry.register(
        LOAD_SINGLE_CHAT,
        Arc::new(LoadSingleChatHandler::new(
            deps.chats.clone(),
            deps.messages.clone(),
        )),
    );
    registry.register(
        LOAD_SINGLE_CHAT,
        Arc::new(MarkChatReadHandler::new(
            deps.chats.clone(),
            deps.messages.clone(),
        )),
    );

    registry.register(
        UPDATE_DETAILS,
        Arc::new(UpdateDetailsHandler::new(deps.users.clone())),
    );
    registry.register(
        SEND_CHAT_MESSAGE,
        Arc::new(SendChatMessageHandler::new(
            deps.chats.clone(),
            deps.messages.clone(),
            deps.fanout.clone(),
            deps.message_max_len,
        )),
    );
    registry.register(
        MARK_AS_READ,
        Arc::new(MarkAsReadHandler::new(
            deps.chats.clone(),
            deps.messages.clone(),
        )),
    );
}

/// Turn a handler outcome into its response.
///
/// Business errors become a `success = false` response for `event`;
/// infrastructure errors propagate and abort the dispatch.
pub(crate) fn respond<T: Serialize>(
    event: &str,
    result: Result<T, DomainError>,
) -> Result<Option<EventResponse>, DomainError> {
    match result {
        Ok(data) => EventResponse::success_from(event, &data).map(Some),
        Err(e) if e.code.is_business() => Ok(Some(EventResponse::failure(event, &e))),
        Err(e) => Err(e),
    }
}

/// Error for a handler invoked with an event it was not registered for.
pub(crate) fn unexpected_event(handler: &str, event: &ClientEvent) -> DomainError {
    DomainError::new(
        ErrorCode::InternalError,
        format!("{} cannot handle {}", handler, event.name()),
    )
}

/// Fails with `Forbidden` unless the payload names the session's own user.
pub(crate) fn require_same_user(session_user: UserId, claimed: UserId) -> Result<(), DomainError> {
    if session_user != claimed {
        return Err(DomainError::new(
            ErrorCode::Forbidden,
            "User id does not match the logged in user",
        ));
    }
    Ok(())
}

/// Loads a chat's participants, failing unless `user_id` is one of them.
pub(crate) async fn require_member(
    chats: &dyn ChatRepository,
    chat_id: ChatId,
    user_id: UserId,
) -> Result<Vec<UserId>, DomainError> {
    let participants = chats.participants(chat_id).await?;
    if participants.is_empty() {
        return Err(DomainError::not_found(format!("Chat {} not found", chat_id)));
    }
    if !participants.contains(&user_id) {
        return Err(DomainError::new(
            ErrorCode::Forbidden,
            format!("Not a member of chat {}", chat_id),
        ));
    }
    Ok(participants)
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn respond_wraps_success() {
        let response = respond("X", Ok(json!({"a": 1}))).unwrap().unwrap();
        assert!(response.success);
        assert_eq!(response.data, Some(json!({"a": 1})));
    }

    #[test]
    fn respond_folds_business_errors() {
        let response = respond::<()>("X", Err(DomainError::conflict("taken")))
            .unwrap()
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.data.unwrap()["code"], "CONFLICT");
    }

    #[test]
    fn respond_propagates_infrastructure_errors() {
        let err = respond::<()>("X", Err(DomainError::database("insert", "down"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn same_user_check() {
        assert!(require_same_user(UserId::new(1), UserId::new(1)).is_ok());
        assert_eq!(
            require_same_user(UserId::new(1), UserId::new(2))
                .unwrap_err()
                .code,
            ErrorCode::Forbidden
        );
    }

    #[tokio::test]
    async fn membership_check() {
        let fx = test_support::Fixture::new();
        let (a, b, c) = (
            fx.user("a", "A").await,
            fx.user("b", "B").await,
            fx.user("c", "C").await,
        );
        let chat = fx.chat(&a, &b).await;

        let members = require_member(fx.store.as_ref(), chat.chat_id, a.user_id)
            .await
            .unwrap();
        assert_eq!(members, vec![a.user_id, b.user_id]);

        let forbidden = require_member(fx.store.as_ref(), chat.chat_id, c.user_id)
            .await
            .unwrap_err();
        assert_eq!(forbidden.code, ErrorCode::Forbidden);

        let missing = require_member(fx.store.as_ref(), ChatId::new(99), a.user_id)
            .await
            .unwrap_err();
        assert_eq!(missing.code, ErrorCode::NotFound);
    }
}
