//! Event registry - maps event names to their ordered handlers.
//!
//! The registry is built mutably during startup and then frozen behind an
//! `Arc`; after that it is only read, so lookups need no locking.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::connections::ConnectionSession;
use crate::domain::foundation::DomainError;

use super::payloads::ClientEvent;
use super::response::EventResponse;

/// A unit of business logic bound to one event name.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle a decoded event for the given session.
    ///
    /// Returning `Ok(None)` means the handler ran but has nothing to send
    /// back. Business failures should already be folded into a
    /// `success = false` response; an `Err` aborts the rest of the dispatch.
    async fn handle(
        &self,
        session: &ConnectionSession,
        event: &ClientEvent,
    ) -> Result<Option<EventResponse>, DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Event name to handlers, in registration order.
#[derive(Default)]
pub struct EventRegistry {
    handlers: HashMap<String, Vec<Arc<dyn EventHandler>>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the handlers of `event_name`.
    pub fn register(&mut self, event_name: impl Into<String>, handler: Arc<dyn EventHandler>) {
        self.handlers
            .entry(event_name.into())
            .or_default()
            .push(handler);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, event_name: impl Into<String>, handler: Arc<dyn EventHandler>) -> Self {
        self.register(event_name, handler);
        self
    }

    /// Handlers for `event_name` in invocation order; empty if unknown.
    pub fn get_all(&self, event_name: &str) -> &[Arc<dyn EventHandler>] {
        self.handlers
            .get(event_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every event name with at least one handler, sorted.
    pub fn list_event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for name in self.list_event_names() {
            let handlers: Vec<&str> = self.get_all(&name).iter().map(|h| h.name()).collect();
            map.entry(&name, &handlers);
        }
        map.finish()
    }
}
