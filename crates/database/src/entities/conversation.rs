//! Conversation entity definitions

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One prompt and the text generated in reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: i64,
    pub session_id: i64,
    pub user_prompt: String,
    pub generated_result: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    pub session_id: i64,
    pub team_id: i64,
    pub user_prompt: String,
    pub generated_result: String,
}
