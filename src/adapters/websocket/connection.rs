//! WebSocket-backed [`ConnectionHandle`].
//!
//! Pushes go into a bounded queue drained by the connection's writer task, so
//! the core never touches the socket directly. Neither pushing nor closing
//! waits on the client: a full queue fails the push, and close requests
//! travel on their own `watch` channel so they get through a full queue.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::ports::{ConnectionHandle, ConnectionId, PushError};

/// Instructions for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    /// Send a text frame.
    Frame(String),
    /// Send a close frame with this reason and stop writing.
    Close(String),
}

/// Receiving side of a [`WsConnection`], owned by the writer task.
#[derive(Debug)]
pub struct OutboundQueue {
    frames: mpsc::Receiver<String>,
    close: watch::Receiver<Option<String>>,
}

impl OutboundQueue {
    /// Next thing the writer should do, or `None` once every handle is gone
    /// and the queue is drained.
    ///
    /// A pending close request wins over queued frames. Cancel safe.
    pub async fn next(&mut self) -> Option<OutboundCommand> {
        let close_requested = tokio::select! {
            biased;
            changed = self.close.changed() => changed.is_ok(),
            frame = self.frames.recv() => return frame.map(OutboundCommand::Frame),
        };

        if close_requested {
            let reason = self.close.borrow_and_update().clone().unwrap_or_default();
            Some(OutboundCommand::Close(reason))
        } else {
            // Every handle is gone; drain what is left.
            self.frames.recv().await.map(OutboundCommand::Frame)
        }
    }
}

/// Handle to one WebSocket connection's outbound queue.
#[derive(Debug, Clone)]
pub struct WsConnection {
    id: ConnectionId,
    frames: mpsc::Sender<String>,
    close: Arc<watch::Sender<Option<String>>>,
}

impl WsConnection {
    /// Creates a handle and the queue its writer task drains. `buffer` is
    /// how many frames may wait before pushes start failing.
    pub fn channel(buffer: usize) -> (Self, OutboundQueue) {
        let (frames_tx, frames_rx) = mpsc::channel(buffer);
        let (close_tx, close_rx) = watch::channel(None);
        let connection = Self {
            id: ConnectionId::new(),
            frames: frames_tx,
            close: Arc::new(close_tx),
        };
        let queue = OutboundQueue {
            frames: frames_rx,
            close: close_rx,
        };
        (connection, queue)
    }
}

#[async_trait]
impl ConnectionHandle for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn push(&self, frame: String) -> Result<(), PushError> {
        self.frames.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => PushError::Full(self.id),
            mpsc::error::TrySendError::Closed(_) => PushError::Closed(self.id),
        })
    }

    async fn close(&self, reason: &str) {
        self.close.send_replace(Some(reason.to_string()));
        if self.close.is_closed() {
            tracing::trace!(connection_id = %self.id, "Close requested on a finished writer");
        }
    }
}
