//! User tags - the public handle other users type to start a chat.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Longest tag accepted.
pub const MAX_TAG_LEN: usize = 32;

/// Returns true if `tag` is a non-empty string of lowercase ASCII letters,
/// digits, `.` and `_`.
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_')
}

/// Validated user tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserTag(String);

impl UserTag {
    /// Validates and wraps a tag.
    pub fn new(tag: impl Into<String>) -> Result<Self, ValidationError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(ValidationError::empty_field("user_tag"));
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(ValidationError::too_long(
                "user_tag",
                MAX_TAG_LEN,
                tag.chars().count(),
            ));
        }
        if !is_valid_tag(&tag) {
            return Err(ValidationError::invalid_format(
                "user_tag",
                "only lowercase letters, digits, '.' and '_' are allowed",
            ));
        }
        Ok(Self(tag))
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserTag {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserTag> for String {
    fn from(tag: UserTag) -> Self {
        tag.0
    }
}
