//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the gateway core and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `UserRepository` - User accounts and identity lookups
//! - `ChatRepository` - Chats, membership and chat list summaries
//! - `MessageRepository` - Messages and per-user read markers
//!
//! ## Transport Port
//!
//! - `ConnectionHandle` - Push capability for one live connection

mod chat_repository;
mod connection_handle;
mod message_repository;
mod user_repository;

pub use chat_repository::ChatRepository;
pub use connection_handle::{ConnectionHandle, ConnectionId, PushError};
pub use message_repository::MessageRepository;
pub use user_repository::UserRepository;
