//! Twaddle Gateway - real-time chat gateway
//!
//! Accepts WebSocket connections, routes named client events to registered
//! handlers, tracks which user is online on which connection and fans chat
//! messages out to the other participants.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
