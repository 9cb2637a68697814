//! Chat handlers: creating chats and loading chat lists and histories.

mod create_user_chat;
mod load_single_chat;
mod load_user_chats;

pub use create_user_chat::CreateUserChatHandler;
pub use load_single_chat::{ChatMessages, LoadSingleChatHandler};
pub use load_user_chats::{LoadUserChatsHandler, UserChats};
