//! In-process adapters: the memory storage backend and a recording
//! connection handle.

mod connection;
mod store;

pub use connection::RecordingConnection;
pub use store::MemoryStore;
