//! AeosGPT Database Crate
//!
//! Connection management, migrations, and the repositories for teams,
//! memberships, chat sessions, conversations and the pet registry.

use sqlx::SqlitePool;
use aeos_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use repos::{
    ChatSessionRepository, ConversationRepository, MembershipRepository, PetRepository,
    TeamRepository, UserRepository,
};

pub use entities::{
    ChatSession, Conversation, CreateChatSessionRequest, CreateConversationRequest,
    CreateTeamRequest, JoinOutcome, Membership, Pet, Team, User,
};

pub use types::{DatabaseError, DatabaseResult, TeamError, TeamResult};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
