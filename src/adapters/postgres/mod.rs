//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresUserRepository` - User accounts and identity lookups
//! - `PostgresChatRepository` - Chats, membership and chat list summaries
//! - `PostgresMessageRepository` - Messages and read markers
//!
//! The schema lives in `migrations/` and is embedded into the binary.

mod chat_repository;
mod message_repository;
mod user_repository;

pub use chat_repository::PostgresChatRepository;
pub use message_repository::PostgresMessageRepository;
pub use user_repository::PostgresUserRepository;

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ChatRepository, MessageRepository, UserRepository};

/// Applies the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// All three repositories over one pool.
pub fn repositories(
    pool: PgPool,
) -> (
    Arc<dyn UserRepository>,
    Arc<dyn ChatRepository>,
    Arc<dyn MessageRepository>,
) {
    (
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresChatRepository::new(pool.clone())),
        Arc::new(PostgresMessageRepository::new(pool)),
    )
}

/// Maps a write failure, turning constraint violations into business errors.
///
/// Unique violations become `Conflict` and foreign key violations become
/// `NotFound`; anything else is a `DatabaseError`.
pub(crate) fn write_error(context: &str, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return DomainError::conflict(format!("{}: {}", context, db.message()));
        }
        if db.is_foreign_key_violation() {
            return DomainError::not_found(format!("{}: {}", context, db.message()));
        }
    }
    DomainError::database(context, e)
}

/// Maps a read failure.
pub(crate) fn read_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(context, e)
}

/// Rows that fail domain validation indicate corrupt data, not bad input.
pub(crate) fn corrupt_row(context: &str, cause: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::InternalError, format!("{}: {}", context, cause))
}
