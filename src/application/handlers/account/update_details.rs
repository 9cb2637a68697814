//! UpdateDetailsHandler - changes a user's firebase id, tag and name.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::application::connections::ConnectionSession;
use crate::application::events::payloads::UpdateDetailsPayload;
use crate::application::events::{ClientEvent, EventHandler, EventResponse};
use crate::application::handlers::{require_same_user, respond, unexpected_event};
use crate::domain::foundation::DomainError;
use crate::domain::user::{NewUser, User};
use crate::ports::UserRepository;

/// Handler for `UPDATE_DETAILS`. Users may only update themselves.
pub struct UpdateDetailsHandler {
    users: Arc<dyn UserRepository>,
}

impl UpdateDetailsHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(
        &self,
        session: &ConnectionSession,
        payload: &UpdateDetailsPayload,
    ) -> Result<User, DomainError> {
        let identity = session.require_identity().await?;
        require_same_user(identity, payload.user_id)?;

        // Same field rules as registration.
        let user = NewUser::new(
            payload.firebase_id.as_str(),
            payload.user_tag.as_str(),
            payload.user_name.as_str(),
        )?
        .into_user(payload.user_id);

        if !self.users.update(&user).await? {
            return Err(DomainError::conflict(
                "Details could not be updated; the tag or firebase id may be taken",
            ));
        }
        info!(user_id = %user.user_id, "User details updated");
        Ok(user)
    }
}

#[async_trait]
impl EventHandler for UpdateDetailsHandler {
    async fn handle(
        &self,
        session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError> {
        let ClientEvent::UpdateDetails(payload) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        respond(event.name(), self.execute(session, payload).await)
    }

    fn name(&self) -> &'static str {
        "UpdateDetailsHandler"
    }
}
