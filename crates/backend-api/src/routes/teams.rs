use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};

use crate::{
    routes::models::{CreateTeamRequest, TeamResponse, TeamsResponse},
    services::team as team_service,
    util::json_body,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/get-teams",
    tag = "Teams",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Teams the caller belongs to", body = TeamsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_teams(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TeamsResponse>, ApiError> {
    let user = state.authenticate(&headers).await?;
    let teams = team_service::list_teams(state.db_pool(), user.id).await?;

    Ok(Json(TeamsResponse {
        teams: teams.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/create-team",
    tag = "Teams",
    security(("bearerAuth" = [])),
    request_body = CreateTeamRequest,
    responses(
        (status = 200, description = "Team created with the caller as first member", body = TeamResponse),
        (status = 400, description = "Blank team name", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_team(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> Result<Json<TeamResponse>, ApiError> {
    let user = state.authenticate(&headers).await?;
    let payload = json_body(payload)?;
    let team = team_service::create_team(
        state.db_pool(),
        user.id,
        &payload.name,
        state.settings().default_credits,
    )
    .await?;

    Ok(Json(TeamResponse { team: team.into() }))
}
