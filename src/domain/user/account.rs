//! The user account as stored and as shown to clients.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{UserId, ValidationError};

use super::tag::UserTag;

/// Longest display name accepted.
pub const MAX_NAME_LEN: usize = 64;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub firebase_id: String,
    pub user_tag: UserTag,
    pub user_name: String,
}

/// Fields required to register a user; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub firebase_id: String,
    pub user_tag: UserTag,
    pub user_name: String,
}

impl NewUser {
    /// Validates raw registration fields.
    pub fn new(
        firebase_id: impl Into<String>,
        user_tag: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            firebase_id: validate_firebase_id(firebase_id.into())?,
            user_tag: UserTag::new(user_tag)?,
            user_name: validate_user_name(user_name.into())?,
        })
    }

    /// Attaches a storage-assigned id.
    pub fn into_user(self, user_id: UserId) -> User {
        User {
            user_id,
            firebase_id: self.firebase_id,
            user_tag: self.user_tag,
            user_name: self.user_name,
        }
    }
}

fn validate_firebase_id(firebase_id: String) -> Result<String, ValidationError> {
    if firebase_id.trim().is_empty() {
        return Err(ValidationError::empty_field("firebase_id"));
    }
    Ok(firebase_id)
}

/// Trims and bounds a display name.
pub fn validate_user_name(name: String) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("user_name"));
    }
    let len = trimmed.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::too_long("user_name", MAX_NAME_LEN, len));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_trims_name() {
        let user = NewUser::new("fb-1", "alice", "  Alice  ").unwrap();
        assert_eq!(user.user_name, "Alice");
        assert_eq!(user.user_tag.as_str(), "alice");
    }

    #[test]
    fn new_user_rejects_blank_firebase_id() {
        assert_eq!(
            NewUser::new("  ", "alice", "Alice"),
            Err(ValidationError::empty_field("firebase_id"))
        );
    }

    #[test]
    fn new_user_rejects_bad_tag() {
        assert!(NewUser::new("fb-1", "Alice!", "Alice").is_err());
    }

    #[test]
    fn user_serializes_with_wire_field_names() {
        let user = NewUser::new("fb-1", "alice", "Alice")
            .unwrap()
            .into_user(UserId::new(3));
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["user_id"], 3);
        assert_eq!(json["user_tag"], "alice");
        assert_eq!(json["user_name"], "Alice");
        assert_eq!(json["firebase_id"], "fb-1");
    }
}
