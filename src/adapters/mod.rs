//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the gateway core to external systems:
//! - `memory` - In-process storage and a recording connection handle
//! - `postgres` - PostgreSQL repositories (sqlx)
//! - `websocket` - Axum WebSocket transport

pub mod memory;
pub mod postgres;
pub mod websocket;

pub use memory::{MemoryStore, RecordingConnection};
pub use websocket::{websocket_router, GatewayState, WsConnection};
