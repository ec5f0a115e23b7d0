//! Request and response bodies shared by the route handlers.

use aeos_auth::User as SessionUser;
use aeos_database::{ChatSession, Conversation, Membership, Team};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamSummary {
    #[serde(rename = "teamId")]
    pub team_id: i64,
    #[serde(rename = "teamName")]
    pub team_name: String,
    pub balance_credits: i64,
    pub token: String,
}

impl From<Team> for TeamSummary {
    fn from(team: Team) -> Self {
        Self {
            team_id: team.id,
            team_name: team.name,
            balance_credits: team.balance_credits,
            token: team.token,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamsResponse {
    pub teams: Vec<TeamSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamResponse {
    pub team: TeamSummary,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatSessionDto {
    pub id: i64,
    pub team_id: i64,
    pub title: String,
    pub created_at: String,
}

impl From<ChatSession> for ChatSessionDto {
    fn from(session: ChatSession) -> Self {
        Self {
            id: session.id,
            team_id: session.team_id,
            title: session.title,
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionsResponse {
    pub sessions: Vec<ChatSessionDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session: ChatSessionDto,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    #[serde(rename = "teamId")]
    pub team_id: i64,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConversationDto {
    pub id: i64,
    pub session_id: i64,
    pub user_prompt: String,
    pub generated_result: String,
    pub created_at: String,
}

impl From<Conversation> for ConversationDto {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            session_id: conversation.session_id,
            user_prompt: conversation.user_prompt,
            generated_result: conversation.generated_result,
            created_at: conversation.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationsResponse {
    pub conversations: Vec<ConversationDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub conversation: ConversationDto,
    pub remaining_credits: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddRowQuery {
    #[serde(rename = "petName")]
    pub pet_name: Option<String>,
    #[serde(rename = "ownerName")]
    pub owner_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendInvitationRequest {
    pub email: String,
    #[serde(rename = "teamId")]
    pub team_id: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AcceptInvitationQuery {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MembershipDto {
    pub id: i64,
    pub team_id: i64,
    pub user_id: i64,
    pub joined_at: String,
}

impl From<Membership> for MembershipDto {
    fn from(membership: Membership) -> Self {
        Self {
            id: membership.id,
            team_id: membership.team_id,
            user_id: membership.user_id,
            joined_at: membership.joined_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MembershipResponse {
    pub membership: MembershipDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<SessionUser> for UserResponse {
    fn from(value: SessionUser) -> Self {
        Self {
            id: value.public_id,
            email: value.email,
            display_name: value.display_name,
        }
    }
}
