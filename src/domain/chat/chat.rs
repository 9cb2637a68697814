//! Chats and the per-user chat list entries.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChatId, MessageId, Timestamp, UserId, ValidationError};

/// A chat between two or more users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub chat_id: ChatId,
    pub created_at: Timestamp,
}

/// A normalized participant set: sorted, without duplicates, at least two
/// distinct users.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Participants(Vec<UserId>);

impl Participants {
    /// Normalizes raw participant ids.
    ///
    /// Rejects sets that collapse to fewer than two distinct users, which is
    /// how a user trying to open a chat with themselves is caught.
    pub fn new(ids: impl IntoIterator<Item = UserId>) -> Result<Self, ValidationError> {
        let mut ids: Vec<UserId> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();
        if ids.len() < 2 {
            return Err(ValidationError::invalid_format(
                "participants",
                "a chat needs at least two distinct users",
            ));
        }
        Ok(Self(ids))
    }

    /// Returns the participant ids in ascending order.
    pub fn ids(&self) -> &[UserId] {
        &self.0
    }

    /// Returns true if `user_id` is part of the set.
    pub fn contains(&self, user_id: UserId) -> bool {
        self.0.binary_search(&user_id).is_ok()
    }
}

/// One row of a user's chat list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub chat_id: ChatId,
    /// Display name: the other participants' user names.
    pub name: String,
    /// Messages by other participants newer than the viewer's read marker.
    pub unreads: i64,
    pub last_message: Option<MessageId>,
    pub last_msg_preview: Option<String>,
    pub time_last_msg: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ChatSummary {
    /// Time of the last message, or the creation time of an empty chat.
    pub fn last_activity(&self) -> Timestamp {
        self.time_last_msg.unwrap_or(self.created_at)
    }
}

/// Orders chats by most recent activity first.
///
/// Ties break on the higher chat id so the order is stable across calls.
pub fn sort_by_recent_activity(chats: &mut [ChatSummary]) {
    chats.sort_by(|a, b| {
        b.last_activity()
            .cmp(&a.last_activity())
            .then_with(|| b.chat_id.cmp(&a.chat_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64, created: i64, last_msg: Option<i64>) -> ChatSummary {
        ChatSummary {
            chat_id: ChatId::new(id),
            name: format!("chat {}", id),
            unreads: 0,
            last_message: last_msg.map(|_| MessageId::new(id)),
            last_msg_preview: None,
            time_last_msg: last_msg.map(Timestamp::from_unix_secs),
            created_at: Timestamp::from_unix_secs(created),
        }
    }

    #[test]
    fn participants_are_sorted_and_deduplicated() {
        let p = Participants::new([UserId::new(5), UserId::new(2), UserId::new(5)]).unwrap();
        assert_eq!(p.ids(), &[UserId::new(2), UserId::new(5)]);
        assert!(p.contains(UserId::new(5)));
        assert!(!p.contains(UserId::new(3)));
    }

    #[test]
    fn participants_reject_single_user() {
        assert!(Participants::new([UserId::new(1), UserId::new(1)]).is_err());
        assert!(Participants::new([]).is_err());
    }

    #[test]
    fn sort_puts_most_recent_message_first() {
        let mut chats = vec![
            summary(1, 100, Some(500)),
            summary(2, 100, Some(900)),
            summary(3, 100, Some(700)),
        ];
        sort_by_recent_activity(&mut chats);
        let ids: Vec<i64> = chats.iter().map(|c| c.chat_id.as_i64()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn empty_chat_sorts_by_creation_time() {
        let mut chats = vec![summary(1, 100, Some(500)), summary(2, 800, None)];
        sort_by_recent_activity(&mut chats);
        assert_eq!(chats[0].chat_id, ChatId::new(2));
    }
}
