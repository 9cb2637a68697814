//! CreateUserHandler - registers a new account.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::application::connections::ConnectionSession;
use crate::application::events::payloads::CreateUserPayload;
use crate::application::events::{ClientEvent, EventHandler, EventResponse};
use crate::application::handlers::{respond, unexpected_event};
use crate::domain::foundation::DomainError;
use crate::domain::user::{NewUser, User};
use crate::ports::UserRepository;

/// Handler for `CREATE_USER`.
///
/// Creating an account does not log the connection in; the client follows up
/// with `LOGIN_USER`.
pub struct CreateUserHandler {
    users: Arc<dyn UserRepository>,
}

impl CreateUserHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(&self, payload: &CreateUserPayload) -> Result<User, DomainError> {
        let new_user = NewUser::new(
            payload.firebase_uid.as_str(),
            payload.usertag.as_str(),
            payload.username.as_str(),
        )?;
        let user = self.users.create(new_user).await?;
        info!(user_id = %user.user_id, user_tag = %user.user_tag, "User created");
        Ok(user)
    }
}

#[async_trait]
impl EventHandler for CreateUserHandler {
    async fn handle(
        &self,
        _session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError> {
        let ClientEvent::CreateUser(payload) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        respond(event.name(), self.execute(payload).await)
    }

    fn name(&self) -> &'static str {
        "CreateUserHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;

    fn payload(firebase_uid: &str, usertag: &str, username: &str) -> ClientEvent {
        ClientEvent::CreateUser(CreateUserPayload {
            firebase_uid: firebase_uid.to_string(),
            usertag: usertag.to_string(),
            username: username.to_string(),
        })
    }

    #[tokio::test]
    async fn creates_user_and_returns_it() {
        let fx = Fixture::new();
        let handler = CreateUserHandler::new(fx.store.clone());
        let (session, _) = fx.session();

        let response = handler
            .handle(&session, &payload("fb-1", "alice", "Alice"))
            .await
            .unwrap()
            .unwrap();

        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data["user_tag"], "alice");
        assert_eq!(data["user_name"], "Alice");
        assert_eq!(data["user_id"], 1);
        assert!(session.identity().await.is_none());
    }

    #[tokio::test]
    async fn duplicate_tag_is_a_failed_response() {
        let fx = Fixture::new();
        fx.user("alice", "Alice").await;
        let handler = CreateUserHandler::new(fx.store.clone());
        let (session, _) = fx.session();

        let response = handler
            .handle(&session, &payload("fb-2", "alice", "Imposter"))
            .await
            .unwrap()
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.data.unwrap()["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn invalid_tag_is_a_failed_response() {
        let fx = Fixture::new();
        let handler = CreateUserHandler::new(fx.store.clone());
        let (session, _) = fx.session();

        let response = handler
            .handle(&session, &payload("fb-1", "Not A Tag", "Alice"))
            .await
            .unwrap()
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.data.unwrap()["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn blank_name_is_a_failed_response() {
        let fx = Fixture::new();
        let handler = CreateUserHandler::new(fx.store.clone());
        let (session, _) = fx.session();

        let response = handler
            .handle(&session, &payload("fb-1", "alice", "   "))
            .await
            .unwrap()
            .unwrap();

        assert!(!response.success);
    }
}
