//! Connections - who is online, per-connection sessions and fanout.

mod fanout;
mod registry;
mod session;

pub use fanout::{FanoutReport, FanoutRouter};
pub use registry::ConnectionRegistry;
pub use session::{ConnectionSession, SessionPhase, SUPERSEDED_REASON};
