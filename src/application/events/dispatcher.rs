//! Event dispatcher - routes one inbound event through its handlers.
//!
//! Dispatch is all-or-nothing: handlers run one after another in
//! registration order, and the first handler error discards every response
//! collected so far.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::application::connections::ConnectionSession;
use crate::domain::foundation::{DomainError, ErrorCode};

use super::frames::InboundEvent;
use super::payloads::ClientEvent;
use super::registry::EventRegistry;
use super::response::EventResponse;

/// Errors that stop an inbound event from producing responses.
///
/// None of these close the connection; the transport logs them and keeps
/// reading.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No handlers registered for event '{event}'")]
    UnknownEvent { event: String },

    #[error("Handler '{handler}' failed for event '{event}': {source}")]
    Handler {
        event: String,
        handler: &'static str,
        #[source]
        source: DomainError,
    },

    #[error("Session is closed")]
    SessionClosed,
}

/// Routes inbound events to the handlers in an [`EventRegistry`].
#[derive(Clone)]
pub struct EventDispatcher {
    registry: Arc<EventRegistry>,
}

impl EventDispatcher {
    pub fn new(registry: Arc<EventRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Run every handler registered for `event`.
    ///
    /// The returned vector has one entry per handler, in registration order,
    /// with `None` for handlers that produced no response. A payload that
    /// does not decode, or a business event sent before login, is answered
    /// with a single `success = false` response and no handler runs.
    pub async fn dispatch(
        &self,
        session: &ConnectionSession,
        event: InboundEvent,
    ) -> Result<Vec<Option<EventResponse>>, DispatchError> {
        let handlers = self.registry.get_all(&event.event);
        if handlers.is_empty() {
            return Err(DispatchError::UnknownEvent { event: event.event });
        }
        if session.is_closed().await {
            return Err(DispatchError::SessionClosed);
        }

        let decoded = match ClientEvent::decode(&event.event, event.data) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(
                    connection_id = %session.connection_id(),
                    event = %event.event,
                    error = %e,
                    "Rejecting undecodable payload"
                );
                let error = DomainError::validation("data", e.to_string());
                return Ok(vec![Some(EventResponse::failure(&event.event, &error))]);
            }
        };

        if decoded.requires_identity() && session.identity().await.is_none() {
            debug!(
                connection_id = %session.connection_id(),
                event = %event.event,
                "Rejecting event on unauthenticated session"
            );
            let error = DomainError::new(ErrorCode::Unauthenticated, "Login required");
            return Ok(vec![Some(EventResponse::failure(&event.event, &error))]);
        }

        let mut results = Vec::with_capacity(handlers.len());
        for handler in handlers {
            match handler.handle(session, &decoded).await {
                Ok(response) => results.push(response),
                Err(source) => {
                    warn!(
                        connection_id = %session.connection_id(),
                        event = %event.event,
                        handler = handler.name(),
                        error = %source,
                        "Handler failed, discarding partial results"
                    );
                    return Err(DispatchError::Handler {
                        event: event.event,
                        handler: handler.name(),
                        source,
                    });
                }
            }
        }

        debug!(
            connection_id = %session.connection_id(),
            event = %event.event,
            handlers = results.len(),
            "Event dispatched"
        );
        Ok(results)
    }
}
