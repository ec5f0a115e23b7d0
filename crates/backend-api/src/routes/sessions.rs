use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};

use crate::{
    routes::models::{CreateSessionRequest, SessionResponse, SessionsResponse},
    services::session as session_service,
    util::json_body,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/get-sessions/{team_id}",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    params(("team_id" = i64, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Chat sessions of the team, newest first", body = SessionsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a member of the team", body = crate::error::ErrorResponse),
        (status = 404, description = "Team not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<i64>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let user = state.authenticate(&headers).await?;
    let sessions = session_service::list_sessions(state.db_pool(), team_id, user.id).await?;

    Ok(Json(SessionsResponse {
        sessions: sessions.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/create-session",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Chat session created", body = SessionResponse),
        (status = 400, description = "Blank title", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a member of the team", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = state.authenticate(&headers).await?;
    let payload = json_body(payload)?;
    let session =
        session_service::create_session(state.db_pool(), payload.team_id, user.id, &payload.title)
            .await?;

    Ok(Json(SessionResponse {
        session: session.into(),
    }))
}
