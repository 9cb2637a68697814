//! Connection registry - which live connection currently speaks for a user.
//!
//! At most one connection is bound per identity. Binding an identity that is
//! already bound replaces the previous handle and hands it back to the
//! caller, which decides what happens to the superseded connection.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::ports::{ConnectionHandle, ConnectionId};

/// Identity to connection map shared by every session.
///
/// A single registry-wide `RwLock` guards the map. Fanout lookups (reads)
/// vastly outnumber logins and disconnects (writes). The lock is never held
/// across a push.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<UserId, Arc<dyn ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `user_id` to `handle`, returning the handle it replaced.
    pub async fn bind(
        &self,
        user_id: UserId,
        handle: Arc<dyn ConnectionHandle>,
    ) -> Option<Arc<dyn ConnectionHandle>> {
        self.connections.write().await.insert(user_id, handle)
    }

    /// Remove whatever connection is bound to `user_id`.
    ///
    /// No-op when nothing is bound.
    pub async fn unbind(&self, user_id: UserId) -> Option<Arc<dyn ConnectionHandle>> {
        self.connections.write().await.remove(&user_id)
    }

    /// Remove the binding for `user_id` only if it still points at
    /// `connection_id`.
    ///
    /// Returns true if an entry was removed. A connection that has been
    /// superseded calls this on close and leaves the newer binding alone.
    pub async fn release(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(&user_id) {
            Some(handle) if handle.id() == connection_id => {
                connections.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    /// The connection currently bound to `user_id`.
    pub async fn lookup(&self, user_id: UserId) -> Option<Arc<dyn ConnectionHandle>> {
        self.connections.read().await.get(&user_id).cloned()
    }

    /// Number of bound identities.
    pub async fn online_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
