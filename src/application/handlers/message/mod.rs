//! Message handlers: sending messages and read state.

mod mark_as_read;
mod send_chat_message;

pub use mark_as_read::{MarkAsReadHandler, MarkChatReadHandler, ReadState};
pub use send_chat_message::SendChatMessageHandler;
