//! Gateway - assembles the event registry and turns inbound text frames into
//! outbound frames for one session.
//!
//! The transport owns sockets and tasks; everything it needs from the core
//! goes through [`Gateway`]:
//!
//! ```text
//! text frame ─► handle_text ─► EventDispatcher ─► handlers ─► Vec<OutboundFrame>
//!                                                   │
//!                                                   └─► FanoutRouter ─► other connections
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::connections::{ConnectionRegistry, ConnectionSession, FanoutRouter};
use crate::application::events::{
    DispatchError, EventDispatcher, EventRegistry, InboundFrame, OutboundFrame,
};
use crate::application::handlers::{register_handlers, HandlerDeps};
use crate::ports::{
    ChatRepository, ConnectionHandle, MessageRepository, PushError, UserRepository,
};

/// Errors from processing one inbound frame.
///
/// All of them are per-frame: the transport logs and keeps the connection.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Frame of {size} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Push(#[from] PushError),
}

/// Tunables for the gateway core.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Close a connection when a newer login for the same user replaces it.
    pub close_superseded: bool,
    /// Largest inbound text frame accepted, in bytes.
    pub max_frame_bytes: usize,
    /// Longest chat message accepted, in characters.
    pub message_max_len: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            close_superseded: true,
            max_frame_bytes: 64 * 1024,
            message_max_len: 4000,
        }
    }
}

/// Storage collaborators.
#[derive(Clone)]
pub struct GatewayDeps {
    pub users: Arc<dyn UserRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

impl GatewayDeps {
    /// Use one store for all three repositories.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + ChatRepository + MessageRepository + 'static,
    {
        Self {
            users: store.clone(),
            chats: store.clone(),
            messages: store,
        }
    }
}

/// The assembled core: registry, dispatcher and connection registry.
pub struct Gateway {
    dispatcher: EventDispatcher,
    connections: Arc<ConnectionRegistry>,
    settings: GatewaySettings,
}

impl Gateway {
    pub fn new(deps: GatewayDeps, settings: GatewaySettings) -> Self {
        let connections = Arc::new(ConnectionRegistry::new());
        let handler_deps = HandlerDeps {
            users: deps.users,
            chats: deps.chats,
            messages: deps.messages,
            fanout: FanoutRouter::new(Arc::clone(&connections)),
            message_max_len: settings.message_max_len,
        };

        let mut registry = EventRegistry::new();
        register_handlers(&mut registry, &handler_deps);
        info!(events = ?registry.list_event_names(), "Event handlers registered");

        Self {
            dispatcher: EventDispatcher::new(Arc::new(registry)),
            connections,
            settings,
        }
    }

    /// Start a session for a freshly accepted connection.
    pub fn open_session(&self, connection: Arc<dyn ConnectionHandle>) -> ConnectionSession {
        ConnectionSession::new(
            connection,
            Arc::clone(&self.connections),
            self.settings.close_superseded,
        )
    }

    /// Process one inbound text frame and return the frames to send back.
    ///
    /// Frames with an opcode other than `1` are ignored and yield nothing.
    pub async fn handle_text(
        &self,
        session: &ConnectionSession,
        text: &str,
    ) -> Result<Vec<OutboundFrame>, GatewayError> {
        if text.len() > self.settings.max_frame_bytes {
            return Err(GatewayError::FrameTooLarge {
                size: text.len(),
                max: self.settings.max_frame_bytes,
            });
        }

        let frame = InboundFrame::parse(text).map_err(GatewayError::MalformedFrame)?;
        if !frame.is_server_event() {
            debug!(
                connection_id = %session.connection_id(),
                op = frame.op,
                "Ignoring frame with unrouted opcode"
            );
            return Ok(Vec::new());
        }
        let event = frame.into_event().map_err(GatewayError::MalformedFrame)?;

        let responses = self.dispatcher.dispatch(session, event).await?;
        responses
            .iter()
            .flatten()
            .map(|r| OutboundFrame::response(r).map_err(GatewayError::Encode))
            .collect()
    }

    /// [`handle_text`](Self::handle_text), then push the responses to the
    /// session's own connection in order. Returns how many were sent.
    pub async fn handle_and_reply(
        &self,
        session: &ConnectionSession,
        text: &str,
    ) -> Result<usize, GatewayError> {
        let frames = self.handle_text(session, text).await?;
        for frame in &frames {
            let json = frame.to_json().map_err(GatewayError::Encode)?;
            session.connection().push(json).await?;
        }
        Ok(frames.len())
    }

    pub fn connections(&self) -> &Arc<ConnectionRegistry> {
        &self.connections
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Names of all events with registered handlers.
    pub fn event_names(&self) -> Vec<String> {
        self.dispatcher.registry().list_event_names()
    }
}
