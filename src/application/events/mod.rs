//! Events - wire frames, typed payloads, the handler registry and dispatch.

mod dispatcher;
mod frames;
pub mod payloads;
mod registry;
mod response;

pub use dispatcher::{DispatchError, EventDispatcher};
pub use frames::{InboundEvent, InboundFrame, OpCode, OutboundFrame};
pub use payloads::ClientEvent;
pub use registry::{EventHandler, EventRegistry};
pub use response::EventResponse;
