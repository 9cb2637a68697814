//! Typed payloads for every client event.
//!
//! Each event name maps to exactly one payload struct. Decoding is strict:
//! missing fields, unknown fields and wrong types are errors, never silent
//! defaults. Ids are the one leniency: `"10"` decodes like `10`.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::foundation::{ChatId, UserId};

pub const CREATE_USER: &str = "CREATE_USER";
pub const LOGIN_USER: &str = "LOGIN_USER";
pub const CREATE_USER_CHAT: &str = "CREATE_USER_CHAT";
pub const LOAD_USER_CHATS: &str = "LOAD_USER_CHATS";
pub const LOAD_SINGLE_CHAT: &str = "LOAD_SINGLE_CHAT";
pub const UPDATE_DETAILS: &str = "UPDATE_DETAILS";
pub const SEND_CHAT_MESSAGE: &str = "SEND_CHAT_MESSAGE";
pub const MARK_AS_READ: &str = "MARK_AS_READ";

/// A decoded client event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "CREATE_USER")]
    CreateUser(CreateUserPayload),
    #[serde(rename = "LOGIN_USER")]
    LoginUser(LoginUserPayload),
    #[serde(rename = "CREATE_USER_CHAT")]
    CreateUserChat(CreateUserChatPayload),
    #[serde(rename = "LOAD_USER_CHATS")]
    LoadUserChats(LoadUserChatsPayload),
    #[serde(rename = "LOAD_SINGLE_CHAT")]
    LoadSingleChat(LoadSingleChatPayload),
    #[serde(rename = "UPDATE_DETAILS")]
    UpdateDetails(UpdateDetailsPayload),
    #[serde(rename = "SEND_CHAT_MESSAGE")]
    SendChatMessage(SendChatMessagePayload),
    #[serde(rename = "MARK_AS_READ")]
    MarkAsRead(MarkAsReadPayload),
}

impl ClientEvent {
    /// Decode the payload of the event called `name`.
    pub fn decode(name: &str, data: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json!({ "event": name, "data": data }))
    }

    /// The wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CreateUser(_) => CREATE_USER,
            ClientEvent::LoginUser(_) => LOGIN_USER,
            ClientEvent::CreateUserChat(_) => CREATE_USER_CHAT,
            ClientEvent::LoadUserChats(_) => LOAD_USER_CHATS,
            ClientEvent::LoadSingleChat(_) => LOAD_SINGLE_CHAT,
            ClientEvent::UpdateDetails(_) => UPDATE_DETAILS,
            ClientEvent::SendChatMessage(_) => SEND_CHAT_MESSAGE,
            ClientEvent::MarkAsRead(_) => MARK_AS_READ,
        }
    }

    /// Events that are only accepted on an authenticated session.
    ///
    /// Account creation and login are the only events that make sense before
    /// an identity is bound.
    pub fn requires_identity(&self) -> bool {
        !matches!(self, ClientEvent::CreateUser(_) | ClientEvent::LoginUser(_))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserPayload {
    pub firebase_uid: String,
    pub usertag: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginUserPayload {
    pub firebase_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserChatPayload {
    pub recv_user_tag: String,
    pub orig_user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadUserChatsPayload {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadSingleChatPayload {
    pub chat_id: ChatId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDetailsPayload {
    pub user_id: UserId,
    pub firebase_id: String,
    pub user_name: String,
    pub user_tag: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendChatMessagePayload {
    pub chat_id: ChatId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkAsReadPayload {
    pub chat_id: ChatId,
}
