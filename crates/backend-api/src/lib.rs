mod error;
mod state;
mod util;

pub mod docs;
pub mod routes;
pub mod services;

pub use error::{ApiError, ErrorField, ErrorResponse, MessageResponse};
pub use state::{ApiSettings, AppState};
pub use util::SESSION_COOKIE;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        // Auth routes
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/me", get(routes::auth::me))
        // Pet registry
        .route("/api/add-row", get(routes::add_row::add_row))
        // Invitation routes
        .route(
            "/api/send-invitation",
            post(routes::invitations::send_invitation),
        )
        .route(
            "/api/accept-invitation/:token",
            post(routes::invitations::accept_invitation),
        )
        // Team routes
        .route("/api/get-teams", get(routes::teams::get_teams))
        .route("/api/create-team", post(routes::teams::create_team))
        // Session routes
        .route(
            "/api/get-sessions/:team_id",
            get(routes::sessions::get_sessions),
        )
        .route("/api/create-session", post(routes::sessions::create_session))
        // Conversation routes
        .route(
            "/api/get-conversations/:session_id",
            get(routes::conversations::get_conversations),
        )
        .route(
            "/api/get-ai-response/:session_id/:message",
            get(routes::ai::get_ai_response),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(docs::ApiDoc::openapi())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
