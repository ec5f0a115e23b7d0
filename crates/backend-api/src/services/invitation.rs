use aeos_auth::{normalize_email, User as SessionUser};
use aeos_database::{
    JoinOutcome, Membership, MembershipRepository, TeamRepository, UserRepository,
};
use aeos_mailer::{InvitationEmail, Mailer};
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::error::ServiceError;
use crate::state::ApiSettings;

/// Email `invitee_email` a link to join `team_id`.
///
/// Full teams are rejected before anything else is looked up. The team and the
/// invitee must both exist and the sender must already be a member; otherwise
/// no email goes out.
pub async fn send_invitation(
    pool: &SqlitePool,
    mailer: &dyn Mailer,
    settings: &ApiSettings,
    sender: &SessionUser,
    invitee_email: &str,
    team_id: i64,
) -> Result<(), ServiceError> {
    let memberships = MembershipRepository::new(pool.clone());

    let members = memberships.count_for_team(team_id).await?;
    if members >= settings.member_limit {
        warn!(team_id, members, limit = settings.member_limit, "invitation rejected, team is full");
        return Err(ServiceError::MemberLimitReached);
    }

    let team = TeamRepository::new(pool.clone())
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team not found"))?;

    if !memberships.is_member(team_id, sender.id).await? {
        return Err(ServiceError::forbidden("Not a member of this team"));
    }

    let invitee = UserRepository::new(pool.clone())
        .find_by_email(&normalize_email(invitee_email))
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))?;

    let inviter_name = sender
        .display_name
        .as_deref()
        .or(sender.email.as_deref())
        .unwrap_or(sender.public_id.as_str())
        .to_string();

    let invitation = InvitationEmail {
        team_name: team.name.clone(),
        team_token: team.token.clone(),
        invitee_id: invitee.id,
        invitee_email: invitee.email.clone().unwrap_or_default(),
        invitee_name: invitee.greeting_name().to_string(),
        inviter_name,
    };

    let receipt = mailer
        .send(invitation.render(&settings.accept_base_url))
        .await?;

    info!(
        team_id,
        invitee_id = invitee.id,
        transport = mailer.transport_name(),
        response = %receipt.response,
        "invitation sent"
    );
    Ok(())
}

/// Join the team behind `token` on behalf of `user_id`.
pub async fn accept_invitation(
    pool: &SqlitePool,
    settings: &ApiSettings,
    caller: &SessionUser,
    token: &str,
    user_id: i64,
) -> Result<Membership, ServiceError> {
    if caller.id != user_id {
        return Err(ServiceError::forbidden("Invitation belongs to another user"));
    }

    let team = TeamRepository::new(pool.clone())
        .find_by_token(token)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team not found"))?;

    UserRepository::new(pool.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))?;

    match MembershipRepository::new(pool.clone())
        .join_within_limit(team.id, user_id, settings.member_limit)
        .await?
    {
        JoinOutcome::Joined(membership) | JoinOutcome::AlreadyMember(membership) => {
            Ok(membership)
        }
        JoinOutcome::TeamFull { limit } => Err(ServiceError::conflict(format!(
            "Team already has the maximum of {limit} members"
        ))),
    }
}
