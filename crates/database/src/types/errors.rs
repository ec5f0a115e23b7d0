//! Error types for the database layer

use thiserror::Error;

/// Connection, migration and raw query failures.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Database query error: {0}")]
    QueryError(#[from] sqlx::Error),
}

/// Team, membership, session and conversation errors.
#[derive(Debug, Error)]
pub enum TeamError {
    #[error("Team not found")]
    TeamNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Chat session not found")]
    SessionNotFound,

    #[error("Team already has the maximum of {limit} members")]
    TeamFull { limit: i64 },

    #[error("Team has no credits left")]
    InsufficientCredits,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}
