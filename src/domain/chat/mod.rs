//! Chat module - chats, chat list summaries and messages.

mod chat;
mod message;

pub use chat::{sort_by_recent_activity, Chat, ChatSummary, Participants};
pub use message::{preview, validate_content, Message, PREVIEW_LEN};
