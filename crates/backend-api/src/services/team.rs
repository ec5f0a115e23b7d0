use aeos_database::{CreateTeamRequest, MembershipRepository, Team, TeamRepository};
use sqlx::SqlitePool;

use super::error::ServiceError;

pub async fn list_teams(pool: &SqlitePool, user_id: i64) -> Result<Vec<Team>, ServiceError> {
    Ok(TeamRepository::new(pool.clone()).list_for_user(user_id).await?)
}

pub async fn create_team(
    pool: &SqlitePool,
    owner_id: i64,
    name: &str,
    balance_credits: i64,
) -> Result<Team, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::bad_request("Team name is required"));
    }

    let team = TeamRepository::new(pool.clone())
        .create(&CreateTeamRequest {
            name: name.to_string(),
            owner_id,
            balance_credits,
        })
        .await?;
    Ok(team)
}

/// Load a team the caller belongs to. Unknown teams are 404, foreign ones 403.
pub async fn require_member_team(
    pool: &SqlitePool,
    team_id: i64,
    user_id: i64,
) -> Result<Team, ServiceError> {
    let team = TeamRepository::new(pool.clone())
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team not found"))?;

    if !MembershipRepository::new(pool.clone())
        .is_member(team_id, user_id)
        .await?
    {
        return Err(ServiceError::forbidden("Not a member of this team"));
    }

    Ok(team)
}
