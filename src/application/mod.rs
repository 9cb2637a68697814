//! Application layer - the gateway core.
//!
//! - `events` - wire frames, typed payloads, handler registry and dispatch
//! - `connections` - connection registry, sessions and fanout
//! - `handlers` - one handler per business operation
//! - `gateway` - assembly and per-frame processing

pub mod connections;
pub mod events;
pub mod gateway;
pub mod handlers;

pub use connections::{ConnectionRegistry, ConnectionSession, FanoutReport, FanoutRouter};
pub use events::{DispatchError, EventDispatcher, EventHandler, EventRegistry, EventResponse};
pub use gateway::{Gateway, GatewayDeps, GatewayError, GatewaySettings};
