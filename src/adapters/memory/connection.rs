//! In-process connection handle that records what it is sent.
//!
//! Stands in for a transport connection wherever no socket exists: unit and
//! integration tests, and local tooling that drives the gateway directly.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::ports::{ConnectionHandle, ConnectionId, PushError};

/// Connection handle that keeps every pushed frame in memory.
///
/// # Example
///
/// ```ignore
/// let conn = Arc::new(RecordingConnection::new());
/// let session = gateway.open_session(conn.clone());
///
/// // ... dispatch events ...
///
/// assert_eq!(conn.frames().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingConnection {
    id: ConnectionId,
    frames: Mutex<Vec<String>>,
    close_reason: Mutex<Option<String>>,
    fail_pushes: AtomicBool,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames pushed so far, in push order.
    pub fn frames(&self) -> Vec<String> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Pushed frames parsed as JSON; frames that are not JSON are skipped.
    pub fn json_frames(&self) -> Vec<serde_json::Value> {
        self.frames()
            .iter()
            .filter_map(|f| serde_json::from_str(f).ok())
            .collect()
    }

    /// Drops the recorded frames.
    pub fn clear(&self) {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Reason given to [`ConnectionHandle::close`], if it was called.
    pub fn close_reason(&self) -> Option<String> {
        self.close_reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.close_reason().is_some()
    }

    /// Makes every later push fail as if the transport had gone away.
    pub fn fail_pushes(&self) {
        self.fail_pushes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionHandle for RecordingConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn push(&self, frame: String) -> Result<(), PushError> {
        if self.fail_pushes.load(Ordering::SeqCst) || self.is_closed() {
            return Err(PushError::Closed(self.id));
        }
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame);
        Ok(())
    }

    async fn close(&self, reason: &str) {
        let mut close_reason = self
            .close_reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if close_reason.is_none() {
            *close_reason = Some(reason.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_frames_in_order() {
        let conn = RecordingConnection::new();
        conn.push("a".to_string()).await.unwrap();
        conn.push("b".to_string()).await.unwrap();
        assert_eq!(conn.frames(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn closed_connection_refuses_pushes() {
        let conn = RecordingConnection::new();
        conn.close("bye").await;
        conn.close("again").await;

        assert_eq!(conn.close_reason().as_deref(), Some("bye"));
        assert_eq!(
            conn.push("x".to_string()).await,
            Err(PushError::Closed(conn.id()))
        );
    }

    #[tokio::test]
    async fn failing_connection_refuses_pushes() {
        let conn = RecordingConnection::new();
        conn.fail_pushes();
        assert!(conn.push("x".to_string()).await.is_err());
        assert!(conn.frames().is_empty());
    }
}
