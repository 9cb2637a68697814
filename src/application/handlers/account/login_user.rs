//! LOGIN_USER handlers.
//!
//! Login is split in two so binding and responding stay separate concerns:
//! [`BindSessionHandler`] attaches the connection to the user, then
//! [`LoginUserHandler`] answers the client.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::connections::ConnectionSession;
use crate::application::events::{ClientEvent, EventHandler, EventResponse};
use crate::application::handlers::{respond, unexpected_event};
use crate::domain::foundation::DomainError;
use crate::domain::user::User;
use crate::ports::UserRepository;

/// Binds the session to the user owning the firebase id. Sends nothing.
///
/// An unknown firebase id leaves the session as it was.
pub struct BindSessionHandler {
    users: Arc<dyn UserRepository>,
}

impl BindSessionHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl EventHandler for BindSessionHandler {
    async fn handle(
        &self,
        session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError> {
        let ClientEvent::LoginUser(payload) = event else {
            return Err(unexpected_event(self.name(), event));
        };

        match self.users.find_by_firebase_id(&payload.firebase_id).await? {
            Some(user) => session.authenticate(user.user_id).await?,
            None => debug!(
                connection_id = %session.connection_id(),
                "Login for unknown firebase id, session left unbound"
            ),
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "BindSessionHandler"
    }
}

/// Responds to `LOGIN_USER` with the logged-in user.
pub struct LoginUserHandler {
    users: Arc<dyn UserRepository>,
}

impl LoginUserHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(
        &self,
        session: &ConnectionSession,
        firebase_id: &str,
    ) -> Result<User, DomainError> {
        let user = self
            .users
            .find_by_firebase_id(firebase_id)
            .await?
            .ok_or_else(|| DomainError::not_found("No user for this firebase id"))?;

        // Only report success once the session actually speaks for the user.
        let identity = session.require_identity().await?;
        if identity != user.user_id {
            return Err(DomainError::not_found("No user for this firebase id"));
        }
        Ok(user)
    }
}

#[async_trait]
impl EventHandler for LoginUserHandler {
    async fn handle(
        &self,
        session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError> {
        let ClientEvent::LoginUser(payload) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        respond(
            event.name(),
            self.execute(session, &payload.firebase_id).await,
        )
    }

    fn name(&self) -> &'static str {
        "LoginUserHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::payloads::LoginUserPayload;
    use crate::application::handlers::test_support::Fixture;
    use crate::ports::ConnectionHandle;

    fn login(firebase_id: &str) -> ClientEvent {
        ClientEvent::LoginUser(LoginUserPayload {
            firebase_id: firebase_id.to_string(),
        })
    }

    #[tokio::test]
    async fn bind_authenticates_known_user() {
        let fx = Fixture::new();
        let alice = fx.user("alice", "Alice").await;
        let (session, conn) = fx.session();

        let response = BindSessionHandler::new(fx.store.clone())
            .handle(&session, &login("fb-alice"))
            .await
            .unwrap();

        assert!(response.is_none());
        assert_eq!(session.identity().await, Some(alice.user_id));
        assert_eq!(
            fx.registry.lookup(alice.user_id).await.unwrap().id(),
            conn.id()
        );
    }

    #[tokio::test]
    async fn bind_ignores_unknown_user() {
        let fx = Fixture::new();
        let (session, _) = fx.session();

        BindSessionHandler::new(fx.store.clone())
            .handle(&session, &login("fb-nobody"))
            .await
            .unwrap();

        assert!(session.identity().await.is_none());
        assert_eq!(fx.registry.online_count().await, 0);
    }

    #[tokio::test]
    async fn login_responds_with_user_after_bind() {
        let fx = Fixture::new();
        fx.user("alice", "Alice").await;
        let (session, _) = fx.session();
        let event = login("fb-alice");

        BindSessionHandler::new(fx.store.clone())
            .handle(&session, &event)
            .await
            .unwrap();
        let response = LoginUserHandler::new(fx.store.clone())
            .handle(&session, &event)
            .await
            .unwrap()
            .unwrap();

        assert!(response.success);
        assert_eq!(response.data.unwrap()["user_tag"], "alice");
    }

    #[tokio::test]
    async fn login_for_unknown_user_fails() {
        let fx = Fixture::new();
        let (session, _) = fx.session();

        let response = LoginUserHandler::new(fx.store.clone())
            .handle(&session, &login("fb-nobody"))
            .await
            .unwrap()
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.data.unwrap()["code"], "NOT_FOUND");
    }
}
