//! WebSocket transport for the gateway.
//!
//! # Architecture
//!
//! ```text
//!   socket ──► reader loop ──► Gateway::handle_and_reply ──► responses
//!                                        │                       │
//!                                        ▼                       ▼
//!                               FanoutRouter ──push──► WsConnection queue
//!                                                                │
//!                                                                ▼
//!                                              writer task ──► socket
//! ```
//!
//! # Components
//!
//! - [`connection`] - `ConnectionHandle` over a bounded outbound queue
//! - [`handler`] - Axum upgrade handler, reader loop and writer task

pub mod connection;
pub mod handler;

pub use connection::{OutboundCommand, OutboundQueue, WsConnection};
pub use handler::{health, ws_handler, GatewayState};

use axum::{routing::get, Router};

/// Create the axum router: the gateway endpoint plus `GET /health`.
///
/// # Example
///
/// ```ignore
/// let app = websocket_router(GatewayState::new(gateway, config.gateway.clone()));
/// ```
pub fn websocket_router(state: GatewayState) -> Router {
    let path = state.config.path.clone();
    Router::new()
        .route("/health", get(health))
        .route(&path, get(ws_handler))
        .with_state(state)
}
