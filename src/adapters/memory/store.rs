//! In-memory storage backend.
//!
//! Implements the user, chat and message repository ports over plain maps
//! behind one async lock. Semantics match the PostgreSQL adapter: ids are
//! assigned sequentially from 1, uniqueness violations are `Conflict`, at
//! most one chat exists per participant set, and read markers never move
//! backwards.
//!
//! Useful for tests and for `storage.backend = "memory"` in local
//! development. Nothing survives a restart.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::chat::{Chat, ChatSummary, Message, Participants};
use crate::domain::foundation::{ChatId, DomainError, MessageId, Timestamp, UserId};
use crate::domain::user::{NewUser, User};
use crate::ports::{ChatRepository, MessageRepository, UserRepository};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    chats: BTreeMap<ChatId, Chat>,
    /// (chat, member) -> last read message id.
    members: BTreeMap<(ChatId, UserId), Option<MessageId>>,
    messages: BTreeMap<MessageId, Message>,
    last_user_id: i64,
    last_chat_id: i64,
    last_message_id: i64,
}

impl Tables {
    fn chat_members(&self, chat_id: ChatId) -> Vec<UserId> {
        self.members
            .range((chat_id, UserId::new(i64::MIN))..=(chat_id, UserId::new(i64::MAX)))
            .map(|((_, user_id), _)| *user_id)
            .collect()
    }

    fn chat_messages(&self, chat_id: ChatId) -> impl DoubleEndedIterator<Item = &Message> {
        self.messages.values().filter(move |m| m.chat_id == chat_id)
    }

    fn chat_between(&self, participants: &Participants) -> Option<&Chat> {
        self.chats
            .values()
            .find(|chat| self.chat_members(chat.chat_id) == participants.ids())
    }

    fn tag_taken(&self, tag: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.user_tag.as_str() == tag && Some(u.user_id) != except)
    }

    fn firebase_id_taken(&self, firebase_id: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.firebase_id == firebase_id && Some(u.user_id) != except)
    }

    fn summary_for(&self, chat: &Chat, viewer: UserId) -> ChatSummary {
        let marker = self.members.get(&(chat.chat_id, viewer)).copied().flatten();

        let mut names: Vec<&str> = self
            .chat_members(chat.chat_id)
            .into_iter()
            .filter(|id| *id != viewer)
            .filter_map(|id| self.users.get(&id))
            .map(|u| u.user_name.as_str())
            .collect();
        names.sort_unstable();

        let unreads = self
            .chat_messages(chat.chat_id)
            .filter(|m| m.author_id != viewer)
            .filter(|m| marker.map_or(true, |read| m.message_id > read))
            .count() as i64;

        let last = self
            .chat_messages(chat.chat_id)
            .max_by_key(|m| m.message_id);

        ChatSummary {
            chat_id: chat.chat_id,
            name: names.join(", "),
            unreads,
            last_message: last.map(|m| m.message_id),
            last_msg_preview: last.map(Message::preview),
            time_last_msg: last.map(|m| m.created_at),
            created_at: chat.created_at,
        }
    }
}

/// Process-local store implementing every storage port.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chats.
    pub async fn chat_count(&self) -> usize {
        self.tables.read().await.chats.len()
    }

    /// Number of stored messages across all chats.
    pub async fn message_count(&self) -> usize {
        self.tables.read().await.messages.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.firebase_id_taken(&user.firebase_id, None) {
            return Err(DomainError::conflict("Firebase id is already registered"));
        }
        if tables.tag_taken(user.user_tag.as_str(), None) {
            return Err(DomainError::conflict(format!(
                "User tag '{}' is already taken",
                user.user_tag
            )));
        }

        tables.last_user_id += 1;
        let user = user.into_user(UserId::new(tables.last_user_id));
        tables.users.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_firebase_id(&self, firebase_id: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.firebase_id == firebase_id)
            .cloned())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.user_tag.as_str() == tag)
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.user_id)
            || tables.tag_taken(user.user_tag.as_str(), Some(user.user_id))
            || tables.firebase_id_taken(&user.firebase_id, Some(user.user_id))
        {
            return Ok(false);
        }
        tables.users.insert(user.user_id, user.clone());
        Ok(true)
    }
}

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn create(&self, participants: &Participants) -> Result<Chat, DomainError> {
        let mut tables = self.tables.write().await;
        if let Some(missing) = participants
            .ids()
            .iter()
            .find(|id| !tables.users.contains_key(*id))
        {
            return Err(DomainError::not_found(format!("User {} not found", missing)));
        }
        if tables.chat_between(participants).is_some() {
            return Err(DomainError::conflict("A chat between these users already exists"));
        }

        tables.last_chat_id += 1;
        let chat = Chat {
            chat_id: ChatId::new(tables.last_chat_id),
            created_at: Timestamp::now(),
        };
        tables.chats.insert(chat.chat_id, chat.clone());
        for user_id in participants.ids() {
            tables.members.insert((chat.chat_id, *user_id), None);
        }
        Ok(chat)
    }

    async fn find_by_participants(
        &self,
        participants: &Participants,
    ) -> Result<Option<Chat>, DomainError> {
        Ok(self.tables.read().await.chat_between(participants).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ChatSummary>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .chats
            .values()
            .filter(|chat| tables.members.contains_key(&(chat.chat_id, user_id)))
            .map(|chat| tables.summary_for(chat, user_id))
            .collect())
    }

    async fn participants(&self, chat_id: ChatId) -> Result<Vec<UserId>, DomainError> {
        Ok(self.tables.read().await.chat_members(chat_id))
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn create(
        &self,
        chat_id: ChatId,
        author_id: UserId,
        content: &str,
    ) -> Result<Message, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.chats.contains_key(&chat_id) {
            return Err(DomainError::not_found(format!("Chat {} not found", chat_id)));
        }

        tables.last_message_id += 1;
        let message = Message {
            message_id: MessageId::new(tables.last_message_id),
            chat_id,
            author_id,
            content: content.to_string(),
            created_at: Timestamp::now(),
        };
        tables.messages.insert(message.message_id, message.clone());
        Ok(message)
    }

    async fn list(&self, chat_id: ChatId) -> Result<Vec<Message>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.chat_messages(chat_id).rev().cloned().collect())
    }

    async fn latest_id(&self, chat_id: ChatId) -> Result<Option<MessageId>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.chat_messages(chat_id).map(|m| m.message_id).max())
    }

    async fn mark_read(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        up_to: MessageId,
    ) -> Result<Option<MessageId>, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(marker) = tables.members.get_mut(&(chat_id, user_id)) else {
            return Ok(None);
        };
        let next = marker.map_or(up_to, |current| current.max(up_to));
        *marker = Some(next);
        Ok(Some(next))
    }

    async fn read_marker(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<Option<MessageId>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .members
            .get(&(chat_id, user_id))
            .copied()
            .flatten())
    }
}
