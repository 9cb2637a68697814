//! Chat messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChatId, MessageId, Timestamp, UserId, ValidationError};

/// Characters kept in a chat list preview.
pub const PREVIEW_LEN: usize = 50;

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub chat_id: ChatId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: Timestamp,
}

impl Message {
    /// Shortened content for chat list rows.
    pub fn preview(&self) -> String {
        preview(&self.content)
    }
}

/// Returns the first [`PREVIEW_LEN`] characters of `content`.
pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_LEN).collect()
}

/// Validates message content against a maximum length in characters.
pub fn validate_content(content: &str, max_len: usize) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::empty_field("content"));
    }
    let len = content.chars().count();
    if len > max_len {
        return Err(ValidationError::too_long("content", max_len, len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundary() {
        let content = "é".repeat(PREVIEW_LEN + 10);
        assert_eq!(preview(&content).chars().count(), PREVIEW_LEN);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn blank_content_is_rejected() {
        assert_eq!(
            validate_content("   ", 100),
            Err(ValidationError::empty_field("content"))
        );
    }

    #[test]
    fn overlong_content_is_rejected() {
        assert!(validate_content("abcdef", 5).is_err());
        assert!(validate_content("abcde", 5).is_ok());
    }
}
