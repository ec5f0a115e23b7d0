use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use tracing::info;

use crate::{
    routes::models::AddRowQuery,
    services::{pet as pet_service, pet::MISSING_NAMES_MESSAGE},
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/add-row",
    tag = "Pets",
    params(AddRowQuery),
    responses(
        (status = 200, description = "Row inserted, empty body"),
        (status = 500, description = "Missing names or storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_row(
    State(state): State<AppState>,
    Query(params): Query<AddRowQuery>,
) -> Result<StatusCode, ApiError> {
    let (pet_name, owner_name) =
        pet_service::validate_names(params.pet_name.as_deref(), params.owner_name.as_deref())
            .ok_or_else(|| ApiError::internal_server_error(MISSING_NAMES_MESSAGE))?;

    let pet = pet_service::add_pet(state.db_pool(), pet_name, owner_name).await?;
    info!(pet_id = pet.id, "added pet row");

    Ok(StatusCode::OK)
}
