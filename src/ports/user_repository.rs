//! User repository port.
//!
//! The user half of the storage collaborator: registration, the identity
//! lookups the handlers resolve users by, and detail updates.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::{NewUser, User};

/// Repository port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a new user.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the firebase id or tag is already taken
    /// - `DatabaseError` on persistence failure
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Find a user by storage id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Find a user by the id issued by the external identity provider.
    async fn find_by_firebase_id(&self, firebase_id: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by tag.
    async fn find_by_tag(&self, tag: &str) -> Result<Option<User>, DomainError>;

    /// Overwrite a user's firebase id, tag and name.
    ///
    /// Returns `false` when no row was updated, either because the user does
    /// not exist or because the new tag/firebase id belongs to someone else.
    async fn update(&self, user: &User) -> Result<bool, DomainError>;
}
