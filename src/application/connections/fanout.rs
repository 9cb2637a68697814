//! Fanout router - delivers one frame to many users' live connections.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::events::OutboundFrame;
use crate::domain::foundation::UserId;

use super::registry::ConnectionRegistry;

/// Outcome of a single fanout, per recipient bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: Vec<UserId>,
    pub offline: Vec<UserId>,
    pub failed: Vec<UserId>,
}

impl FanoutReport {
    /// Number of distinct recipients considered.
    pub fn recipients(&self) -> usize {
        self.delivered.len() + self.offline.len() + self.failed.len()
    }
}

/// Pushes frames to whichever recipients are currently online.
///
/// Delivery is fire-and-forget: offline users are skipped, and a failing or
/// stalled connection never stops delivery to the others. Pushes do not wait
/// on clients, so one slow reader cannot hold up the sender. Callers exclude
/// the sender from `recipients` themselves.
#[derive(Clone)]
pub struct FanoutRouter {
    registry: Arc<ConnectionRegistry>,
}

impl FanoutRouter {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `frame` to each distinct recipient's bound connection.
    ///
    /// The frame is serialized once; the only error is a serialization
    /// failure, in which case nothing is sent.
    pub async fn fanout(
        &self,
        frame: &OutboundFrame,
        recipients: impl IntoIterator<Item = UserId>,
    ) -> Result<FanoutReport, serde_json::Error> {
        let payload = frame.to_json()?;
        let recipients: BTreeSet<UserId> = recipients.into_iter().collect();
        let mut report = FanoutReport::default();

        for user_id in recipients {
            let Some(handle) = self.registry.lookup(user_id).await else {
                report.offline.push(user_id);
                continue;
            };
            match handle.push(payload.clone()).await {
                Ok(()) => report.delivered.push(user_id),
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        connection_id = %handle.id(),
                        error = %e,
                        "Push failed, skipping recipient"
                    );
                    report.failed.push(user_id);
                }
            }
        }

        debug!(
            delivered = report.delivered.len(),
            offline = report.offline.len(),
            failed = report.failed.len(),
            "Fanout complete"
        );
        Ok(report)
    }
}
