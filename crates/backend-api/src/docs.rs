use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::add_row::add_row,
        crate::routes::invitations::send_invitation,
        crate::routes::invitations::accept_invitation,
        crate::routes::teams::get_teams,
        crate::routes::teams::create_team,
        crate::routes::sessions::get_sessions,
        crate::routes::sessions::create_session,
        crate::routes::conversations::get_conversations,
        crate::routes::ai::get_ai_response
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::error::MessageResponse,
            crate::routes::health::HealthResponse,
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::RegisterResponse,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::LoginResponse,
            crate::routes::models::UserResponse,
            crate::routes::models::TeamSummary,
            crate::routes::models::TeamsResponse,
            crate::routes::models::TeamResponse,
            crate::routes::models::CreateTeamRequest,
            crate::routes::models::ChatSessionDto,
            crate::routes::models::SessionsResponse,
            crate::routes::models::SessionResponse,
            crate::routes::models::CreateSessionRequest,
            crate::routes::models::ConversationDto,
            crate::routes::models::ConversationsResponse,
            crate::routes::models::ConversationResponse,
            crate::routes::models::SendInvitationRequest,
            crate::routes::models::MembershipDto,
            crate::routes::models::MembershipResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Password accounts and sessions"),
        (name = "Pets", description = "Pet registry rows"),
        (name = "Invitations", description = "Inviting users into teams"),
        (name = "Teams", description = "Teams and their credit balance"),
        (name = "Sessions", description = "Chat sessions within a team"),
        (name = "Conversations", description = "Conversation history and AI responses")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
