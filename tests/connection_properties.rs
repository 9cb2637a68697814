//! Property tests for the connection registry and fanout router.
//!
//! - Binding is last-write-wins per user, whatever the interleaving of users
//! - Fanout reaches every online recipient exactly once and nobody else

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use twaddle_gateway::adapters::memory::RecordingConnection;
use twaddle_gateway::application::events::OutboundFrame;
use twaddle_gateway::application::{ConnectionRegistry, FanoutRouter};
use twaddle_gateway::domain::foundation::UserId;
use twaddle_gateway::ports::{ConnectionHandle, ConnectionId};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap_or_else(|e| panic!("runtime build failed: {e}"))
        .block_on(future)
}

/// A sequence of `(user, connection)` binds over a small id space.
fn bind_ops_strategy() -> impl Strategy<Value = Vec<(i64, usize)>> {
    prop::collection::vec((0i64..6, 0usize..8), 0..40)
}

proptest! {
    #[test]
    fn last_bind_wins(ops in bind_ops_strategy()) {
        let conns: Vec<Arc<RecordingConnection>> =
            (0..8).map(|_| Arc::new(RecordingConnection::new())).collect();

        let expected: HashMap<i64, ConnectionId> = ops
            .iter()
            .map(|(user, conn)| (*user, conns[*conn].id()))
            .collect();

        let bound = block_on(async {
            let registry = ConnectionRegistry::new();
            for (user, conn) in &ops {
                registry.bind(UserId::new(*user), conns[*conn].clone()).await;
            }
            let mut bound = HashMap::new();
            for user in 0..6 {
                if let Some(handle) = registry.lookup(UserId::new(user)).await {
                    bound.insert(user, handle.id());
                }
            }
            prop_assert_eq!(registry.online_count().await, expected.len());
            Ok(bound)
        })?;

        prop_assert_eq!(bound, expected);
    }

    #[test]
    fn fanout_delivers_once_to_online_recipients_only(
        online in prop::collection::btree_set(0i64..10, 0..10),
        recipients in prop::collection::vec(0i64..10, 0..30),
    ) {
        let conns: HashMap<i64, Arc<RecordingConnection>> = (0..10)
            .map(|user| (user, Arc::new(RecordingConnection::new())))
            .collect();

        let report = block_on(async {
            let registry = Arc::new(ConnectionRegistry::new());
            for user in &online {
                registry.bind(UserId::new(*user), conns[user].clone()).await;
            }
            let frame = OutboundFrame::push(&json!({"content": "hi"}))
                .unwrap_or_else(|e| panic!("frame encode failed: {e}"));
            FanoutRouter::new(registry)
                .fanout(&frame, recipients.iter().copied().map(UserId::new))
                .await
                .unwrap_or_else(|e| panic!("fanout failed: {e}"))
        });

        let distinct: BTreeSet<i64> = recipients.iter().copied().collect();
        prop_assert_eq!(report.recipients(), distinct.len());

        for (user, conn) in &conns {
            let expected = usize::from(distinct.contains(user) && online.contains(user));
            prop_assert_eq!(conn.frames().len(), expected, "user {}", user);
        }

        let delivered: BTreeSet<i64> = report.delivered.iter().map(|id| id.as_i64()).collect();
        let reachable: BTreeSet<i64> = distinct.intersection(&online).copied().collect();
        prop_assert_eq!(delivered, reachable);
    }

    #[test]
    fn release_never_removes_a_newer_binding(first in 0usize..4, second in 0usize..4) {
        let conns: Vec<Arc<RecordingConnection>> =
            (0..4).map(|_| Arc::new(RecordingConnection::new())).collect();
        let user = UserId::new(1);

        let (released, still_bound) = block_on(async {
            let registry = ConnectionRegistry::new();
            registry.bind(user, conns[first].clone()).await;
            registry.bind(user, conns[second].clone()).await;
            let released = registry.release(user, conns[first].id()).await;
            (released, registry.lookup(user).await.map(|h| h.id()))
        });

        if first == second {
            prop_assert!(released);
            prop_assert_eq!(still_bound, None);
        } else {
            prop_assert!(!released);
            prop_assert_eq!(still_bound, Some(conns[second].id()));
        }
    }
}
