//! ConnectionHandle port - the capability to write to one live connection.
//!
//! The transport owns the connection; the rest of the system only ever holds
//! an `Arc<dyn ConnectionHandle>` and can push serialized frames into it or
//! ask it to close.

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a transport connection.
///
/// Generated server-side when a client connects; distinguishes an old and a
/// new connection of the same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when pushing to a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    /// The transport side is gone.
    #[error("Connection {0} is closed")]
    Closed(ConnectionId),

    /// The connection is not draining its queue; the frame was dropped.
    #[error("Outbound queue of connection {0} is full")]
    Full(ConnectionId),
}

/// Port for writing to a single live connection.
#[async_trait]
pub trait ConnectionHandle: Send + Sync {
    /// Identity of the underlying transport connection.
    fn id(&self) -> ConnectionId;

    /// Queue a serialized frame for delivery.
    ///
    /// Frames pushed through one handle are delivered in push order. Must not
    /// wait on the client: a connection that is not keeping up fails the push
    /// with [`PushError::Full`].
    async fn push(&self, frame: String) -> Result<(), PushError>;

    /// Ask the transport to close the connection.
    ///
    /// Best effort and never waits on the client. Closing an already closed
    /// connection is a no-op.
    async fn close(&self, reason: &str);
}
