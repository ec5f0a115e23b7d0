use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::{
    routes::models::{
        AcceptInvitationQuery, MembershipResponse, SendInvitationRequest,
    },
    services::invitation as invitation_service,
    util::json_body,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/api/send-invitation",
    tag = "Invitations",
    security(("bearerAuth" = [])),
    request_body = SendInvitationRequest,
    responses(
        (status = 200, description = "Invitation email sent, empty body"),
        (status = 401, description = "Not signed in, or the team is full", body = crate::error::MessageResponse),
        (status = 403, description = "Sender is not a member of the team", body = crate::error::MessageResponse),
        (status = 404, description = "Team or invitee not found", body = crate::error::MessageResponse),
        (status = 500, description = "Lookup or delivery failed", body = crate::error::MessageResponse)
    )
)]
pub async fn send_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SendInvitationRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let sender = state
        .authenticate(&headers)
        .await
        .map_err(ApiError::into_message_body)?;
    let payload = json_body(payload).map_err(ApiError::into_message_body)?;

    invitation_service::send_invitation(
        state.db_pool(),
        state.mailer(),
        state.settings(),
        &sender,
        &payload.email,
        payload.team_id,
    )
    .await
    .map_err(|e| ApiError::from(e).into_message_body())?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/accept-invitation/{token}",
    tag = "Invitations",
    security(("bearerAuth" = [])),
    params(
        ("token" = String, Path, description = "Team invitation token"),
        AcceptInvitationQuery
    ),
    responses(
        (status = 200, description = "Caller is a member of the team", body = MembershipResponse),
        (status = 401, description = "Authentication required", body = crate::error::MessageResponse),
        (status = 403, description = "Invitation addressed to another user", body = crate::error::MessageResponse),
        (status = 404, description = "Unknown token or user", body = crate::error::MessageResponse),
        (status = 409, description = "Team is full", body = crate::error::MessageResponse)
    )
)]
pub async fn accept_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(token): Path<String>,
    Query(query): Query<AcceptInvitationQuery>,
) -> Result<Json<MembershipResponse>, ApiError> {
    let caller = state
        .authenticate(&headers)
        .await
        .map_err(ApiError::into_message_body)?;

    let membership = invitation_service::accept_invitation(
        state.db_pool(),
        state.settings(),
        &caller,
        &token,
        query.user_id,
    )
    .await
    .map_err(|e| ApiError::from(e).into_message_body())?;

    Ok(Json(MembershipResponse {
        membership: membership.into(),
    }))
}
