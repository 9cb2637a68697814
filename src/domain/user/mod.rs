//! User module - accounts and the tags users find each other by.

mod account;
mod tag;

pub use account::{validate_user_name, NewUser, User, MAX_NAME_LEN};
pub use tag::{is_valid_tag, UserTag, MAX_TAG_LEN};
