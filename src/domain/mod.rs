//! Domain layer containing business types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `user` - User accounts and tags
//! - `chat` - Chats, chat list summaries and messages

pub mod chat;
pub mod foundation;
pub mod user;
