//! Per-connection session state.
//!
//! A session starts unauthenticated, becomes authenticated on login and ends
//! closed when the transport goes away. The session is the only thing that
//! binds and releases its identity in the [`ConnectionRegistry`].

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{ConnectionHandle, ConnectionId};

use super::registry::ConnectionRegistry;

/// Close reason sent to a connection replaced by a newer login.
pub const SUPERSEDED_REASON: &str = "superseded";

/// Lifecycle phase of a connection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Connected, no identity bound yet.
    #[default]
    Unauthenticated,

    /// Logged in; the identity is bound in the registry.
    Authenticated,

    /// Transport closed. Terminal.
    Closed,
}

impl SessionPhase {
    /// Whether a session in this phase may move to `next`. Re-login, possibly
    /// as another user, keeps a session authenticated.
    pub fn can_become(self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (Unauthenticated, Authenticated | Closed) | (Authenticated, Authenticated | Closed)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == SessionPhase::Closed
    }

    fn advance(self, next: SessionPhase) -> Result<SessionPhase, DomainError> {
        if self.can_become(next) {
            Ok(next)
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                format!("Session cannot go from {:?} to {:?}", self, next),
            ))
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    phase: SessionPhase,
    identity: Option<UserId>,
}

/// One client connection and the identity it has logged in as.
pub struct ConnectionSession {
    connection: Arc<dyn ConnectionHandle>,
    registry: Arc<ConnectionRegistry>,
    close_superseded: bool,
    state: Mutex<SessionState>,
}

impl ConnectionSession {
    pub fn new(
        connection: Arc<dyn ConnectionHandle>,
        registry: Arc<ConnectionRegistry>,
        close_superseded: bool,
    ) -> Self {
        Self {
            connection,
            registry,
            close_superseded,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection.id()
    }

    /// Handle for writing back to this session's own connection.
    pub fn connection(&self) -> &Arc<dyn ConnectionHandle> {
        &self.connection
    }

    pub async fn identity(&self) -> Option<UserId> {
        self.state.lock().await.identity
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase
    }

    pub async fn is_closed(&self) -> bool {
        self.phase().await == SessionPhase::Closed
    }

    /// The bound identity, or an `Unauthenticated` error.
    pub async fn require_identity(&self) -> Result<UserId, DomainError> {
        self.identity()
            .await
            .ok_or_else(|| DomainError::new(ErrorCode::Unauthenticated, "Login required"))
    }

    /// Bind this connection to `user_id`.
    ///
    /// Logging in as another user first releases the old identity. If the
    /// identity was bound to a different connection, that connection is
    /// replaced and, when configured, asked to close.
    pub async fn authenticate(&self, user_id: UserId) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let next = state.phase.advance(SessionPhase::Authenticated)?;

        if let Some(previous) = state.identity.filter(|id| *id != user_id) {
            self.registry.release(previous, self.connection_id()).await;
            debug!(
                connection_id = %self.connection_id(),
                previous_user_id = %previous,
                "Released previous identity on re-login"
            );
        }

        let superseded = self
            .registry
            .bind(user_id, Arc::clone(&self.connection))
            .await;
        state.phase = next;
        state.identity = Some(user_id);
        drop(state);

        info!(
            connection_id = %self.connection_id(),
            user_id = %user_id,
            "Session authenticated"
        );

        if let Some(old) = superseded.filter(|old| old.id() != self.connection_id()) {
            info!(
                user_id = %user_id,
                superseded_connection_id = %old.id(),
                "Login superseded an existing connection"
            );
            if self.close_superseded {
                old.close(SUPERSEDED_REASON).await;
            }
        }
        Ok(())
    }

    /// Move to `Closed` and release this connection's registry entry.
    ///
    /// Idempotent. Only removes the entry if it still points at this
    /// connection.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.phase == SessionPhase::Closed {
            return;
        }
        if let Some(user_id) = state.identity {
            let released = self.registry.release(user_id, self.connection_id()).await;
            debug!(
                connection_id = %self.connection_id(),
                user_id = %user_id,
                released,
                "Session released identity"
            );
        }
        state.phase = SessionPhase::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::RecordingConnection;
    use crate::adapters::websocket::{OutboundCommand, WsConnection};
    use std::time::Duration;
    use tokio::time::timeout;

    fn session_on(registry: &Arc<ConnectionRegistry>) -> (ConnectionSession, Arc<RecordingConnection>) {
        let conn = Arc::new(RecordingConnection::new());
        let session = ConnectionSession::new(conn.clone(), Arc::clone(registry), true);
        (session, conn)
    }

    mod phase {
        use super::*;

        #[test]
        fn starts_unauthenticated() {
            assert_eq!(SessionPhase::default(), SessionPhase::Unauthenticated);
        }

        #[test]
        fn closed_is_terminal() {
            assert!(SessionPhase::Closed.is_terminal());
            assert!(!SessionPhase::Closed.can_become(SessionPhase::Authenticated));
            assert!(!SessionPhase::Closed.can_become(SessionPhase::Closed));
            let err = SessionPhase::Closed
                .advance(SessionPhase::Authenticated)
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::Forbidden);
        }

        #[test]
        fn cannot_return_to_unauthenticated() {
            assert!(!SessionPhase::Authenticated.can_become(SessionPhase::Unauthenticated));
            assert!(SessionPhase::Authenticated.can_become(SessionPhase::Authenticated));
        }
    }

    #[tokio::test]
    async fn authenticate_binds_identity() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (session, conn) = session_on(&registry);

        session.authenticate(UserId::new(7)).await.unwrap();

        assert_eq!(session.phase().await, SessionPhase::Authenticated);
        assert_eq!(session.require_identity().await.unwrap(), UserId::new(7));
        assert_eq!(registry.lookup(UserId::new(7)).await.unwrap().id(), conn.id());
    }

    #[tokio::test]
    async fn require_identity_fails_before_login() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (session, _) = session_on(&registry);

        let err = session.require_identity().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }

    #[tokio::test]
    async fn close_unbinds_identity() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (session, _) = session_on(&registry);
        session.authenticate(UserId::new(7)).await.unwrap();

        session.close().await;

        assert!(session.is_closed().await);
        assert!(registry.lookup(UserId::new(7)).await.is_none());
    }

    #[tokio::test]
    async fn cannot_authenticate_after_close() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (session, _) = session_on(&registry);
        session.close().await;

        assert!(session.authenticate(UserId::new(1)).await.is_err());
        assert!(registry.lookup(UserId::new(1)).await.is_none());
    }

    #[tokio::test]
    async fn reconnect_supersedes_and_closes_old_connection() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (old_session, old_conn) = session_on(&registry);
        let (new_session, new_conn) = session_on(&registry);

        old_session.authenticate(UserId::new(1)).await.unwrap();
        new_session.authenticate(UserId::new(1)).await.unwrap();

        assert_eq!(old_conn.close_reason().as_deref(), Some(SUPERSEDED_REASON));
        assert_eq!(registry.lookup(UserId::new(1)).await.unwrap().id(), new_conn.id());

        // The old session closing must not unbind the new one.
        old_session.close().await;
        assert_eq!(registry.lookup(UserId::new(1)).await.unwrap().id(), new_conn.id());
    }

    #[tokio::test]
    async fn stalled_old_connection_does_not_hold_up_login() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (stalled, mut queue) = WsConnection::channel(1);
        stalled.push("never read".to_string()).await.unwrap();
        let old_session = ConnectionSession::new(Arc::new(stalled), Arc::clone(&registry), true);
        let (new_session, new_conn) = session_on(&registry);
        old_session.authenticate(UserId::new(4)).await.unwrap();

        timeout(Duration::from_secs(2), new_session.authenticate(UserId::new(4)))
            .await
            .expect("login waited on the superseded connection")
            .unwrap();

        assert_eq!(registry.lookup(UserId::new(4)).await.unwrap().id(), new_conn.id());
        assert_eq!(
            queue.next().await,
            Some(OutboundCommand::Close(SUPERSEDED_REASON.to_string()))
        );
    }

    #[tokio::test]
    async fn superseded_connection_stays_open_when_configured() {
        let registry = Arc::new(ConnectionRegistry::new());
        let first = Arc::new(RecordingConnection::new());
        let old_session = ConnectionSession::new(first.clone(), Arc::clone(&registry), false);
        let new_session = ConnectionSession::new(
            Arc::new(RecordingConnection::new()),
            Arc::clone(&registry),
            false,
        );

        old_session.authenticate(UserId::new(2)).await.unwrap();
        new_session.authenticate(UserId::new(2)).await.unwrap();

        assert!(first.close_reason().is_none());
        assert!(!old_session.is_closed().await);
    }

    #[tokio::test]
    async fn relogin_as_other_user_releases_old_identity() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (session, conn) = session_on(&registry);

        session.authenticate(UserId::new(1)).await.unwrap();
        session.authenticate(UserId::new(2)).await.unwrap();

        assert!(registry.lookup(UserId::new(1)).await.is_none());
        assert_eq!(registry.lookup(UserId::new(2)).await.unwrap().id(), conn.id());
        assert_eq!(session.identity().await, Some(UserId::new(2)));
    }

    #[tokio::test]
    async fn relogin_as_same_user_does_not_close_self() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (session, conn) = session_on(&registry);

        session.authenticate(UserId::new(1)).await.unwrap();
        session.authenticate(UserId::new(1)).await.unwrap();

        assert!(conn.close_reason().is_none());
        assert_eq!(registry.lookup(UserId::new(1)).await.unwrap().id(), conn.id());
    }
}
