//! Repository for chat sessions.

use crate::entities::{ChatSession, CreateChatSessionRequest};
use crate::types::{TeamError, TeamResult};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

#[derive(Clone)]
pub struct ChatSessionRepository {
    pool: SqlitePool,
}

impl ChatSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateChatSessionRequest) -> TeamResult<ChatSession> {
        let now = Utc::now().to_rfc3339();

        let id = sqlx::query("INSERT INTO chat_sessions (team_id, title, created_at) VALUES (?, ?, ?)")
            .bind(request.team_id)
            .bind(&request.title)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    TeamError::TeamNotFound
                }
                other => other.into(),
            })?
            .last_insert_rowid();

        info!(session_id = id, team_id = request.team_id, "created chat session");

        Ok(ChatSession {
            id,
            team_id: request.team_id,
            title: request.title.clone(),
            created_at: now,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> TeamResult<Option<ChatSession>> {
        let session = sqlx::query_as::<_, ChatSession>(
            "SELECT id, team_id, title, created_at FROM chat_sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Newest sessions first.
    pub async fn list_for_team(&self, team_id: i64) -> TeamResult<Vec<ChatSession>> {
        let sessions = sqlx::query_as::<_, ChatSession>(
            "SELECT id, team_id, title, created_at FROM chat_sessions WHERE team_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }
}
