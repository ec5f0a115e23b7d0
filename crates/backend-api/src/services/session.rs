use aeos_database::{ChatSession, ChatSessionRepository, CreateChatSessionRequest};
use sqlx::SqlitePool;

use super::error::ServiceError;
use super::team::require_member_team;

pub async fn list_sessions(
    pool: &SqlitePool,
    team_id: i64,
    user_id: i64,
) -> Result<Vec<ChatSession>, ServiceError> {
    require_member_team(pool, team_id, user_id).await?;
    Ok(ChatSessionRepository::new(pool.clone())
        .list_for_team(team_id)
        .await?)
}

pub async fn create_session(
    pool: &SqlitePool,
    team_id: i64,
    user_id: i64,
    title: &str,
) -> Result<ChatSession, ServiceError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::bad_request("Session title is required"));
    }

    require_member_team(pool, team_id, user_id).await?;

    Ok(ChatSessionRepository::new(pool.clone())
        .create(&CreateChatSessionRequest {
            team_id,
            title: title.to_string(),
        })
        .await?)
}

/// Load a session whose team the caller belongs to.
pub async fn require_member_session(
    pool: &SqlitePool,
    session_id: i64,
    user_id: i64,
) -> Result<ChatSession, ServiceError> {
    let session = ChatSessionRepository::new(pool.clone())
        .find_by_id(session_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Chat session not found"))?;

    require_member_team(pool, session.team_id, user_id).await?;
    Ok(session)
}
