use aeos_assistant::{CompletionProvider, CompletionRequest, Exchange};
use aeos_database::{
    Conversation, ConversationRepository, CreateConversationRequest, TeamRepository,
};
use sqlx::SqlitePool;
use tracing::info;

use super::error::ServiceError;
use super::session::require_member_session;

pub async fn list_conversations(
    pool: &SqlitePool,
    session_id: i64,
    user_id: i64,
) -> Result<Vec<Conversation>, ServiceError> {
    require_member_session(pool, session_id, user_id).await?;
    Ok(ConversationRepository::new(pool.clone())
        .list_for_session(session_id)
        .await?)
}

/// Ask the assistant to answer `message` in the context of the session so far,
/// then store the exchange and charge the team one credit.
pub async fn generate_response(
    pool: &SqlitePool,
    assistant: Option<&dyn CompletionProvider>,
    session_id: i64,
    user_id: i64,
    message: &str,
) -> Result<(Conversation, i64), ServiceError> {
    let prompt = message.trim();
    if prompt.is_empty() {
        return Err(ServiceError::bad_request("Message is required"));
    }

    let session = require_member_session(pool, session_id, user_id).await?;

    let team = TeamRepository::new(pool.clone())
        .find_by_id(session.team_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team not found"))?;
    if team.balance_credits <= 0 {
        return Err(ServiceError::InsufficientCredits);
    }

    let assistant = assistant.ok_or(ServiceError::AssistantUnavailable)?;

    let conversations = ConversationRepository::new(pool.clone());
    let history = conversations
        .list_for_session(session_id)
        .await?
        .into_iter()
        .map(|conversation| Exchange {
            prompt: conversation.user_prompt,
            answer: conversation.generated_result,
        })
        .collect();

    let completion = assistant
        .complete(CompletionRequest {
            history,
            prompt: prompt.to_string(),
        })
        .await?;

    let (conversation, remaining) = conversations
        .record_charged(&CreateConversationRequest {
            session_id,
            team_id: team.id,
            user_prompt: prompt.to_string(),
            generated_result: completion.content,
        })
        .await?;

    info!(
        session_id,
        team_id = team.id,
        model = %completion.model,
        remaining_credits = remaining,
        "generated AI response"
    );

    Ok((conversation, remaining))
}
