use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::{
    routes::models::ConversationResponse,
    services::conversation as conversation_service,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/get-ai-response/{session_id}/{message}",
    tag = "Conversations",
    security(("bearerAuth" = [])),
    params(
        ("session_id" = i64, Path, description = "Chat session identifier"),
        ("message" = String, Path, description = "Percent-encoded prompt text")
    ),
    responses(
        (status = 200, description = "Stored exchange", body = ConversationResponse),
        (status = 400, description = "Empty message", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 402, description = "Team has no credits left", body = crate::error::ErrorResponse),
        (status = 502, description = "AI backend failed", body = crate::error::ErrorResponse),
        (status = 503, description = "AI backend not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_ai_response(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((session_id, message)): Path<(i64, String)>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let user = state.authenticate(&headers).await?;
    let (conversation, remaining_credits) = conversation_service::generate_response(
        state.db_pool(),
        state.assistant(),
        session_id,
        user.id,
        &message,
    )
    .await?;

    Ok(Json(ConversationResponse {
        conversation: conversation.into(),
        remaining_credits,
    }))
}
