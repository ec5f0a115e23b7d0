use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::{
    routes::models::ConversationsResponse,
    services::conversation as conversation_service,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/get-conversations/{session_id}",
    tag = "Conversations",
    security(("bearerAuth" = [])),
    params(("session_id" = i64, Path, description = "Chat session identifier")),
    responses(
        (status = 200, description = "Exchanges in creation order", body = ConversationsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a member of the session's team", body = crate::error::ErrorResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_conversations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<i64>,
) -> Result<Json<ConversationsResponse>, ApiError> {
    let user = state.authenticate(&headers).await?;
    let conversations =
        conversation_service::list_conversations(state.db_pool(), session_id, user.id).await?;

    Ok(Json(ConversationsResponse {
        conversations: conversations.into_iter().map(Into::into).collect(),
    }))
}
