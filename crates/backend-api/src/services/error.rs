use aeos_assistant::AssistantError;
use aeos_auth::AuthError;
use aeos_database::{DatabaseError, TeamError};
use aeos_mailer::MailError;
use axum::http::StatusCode;

pub const MEMBER_LIMIT_MESSAGE: &str = "Max number of users in a single team is reached";

#[derive(Debug)]
pub enum ServiceError {
    NotFound(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    MemberLimitReached,
    InsufficientCredits,
    AssistantUnavailable,
    Assistant(AssistantError),
    Mail(MailError),
    Database(String),
    Auth(AuthError),
    Internal(String),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<ServiceError> for crate::ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => crate::ApiError::not_found(msg),
            ServiceError::Forbidden(msg) => crate::ApiError::forbidden(msg),
            ServiceError::BadRequest(msg) => crate::ApiError::bad_request(msg),
            ServiceError::Conflict(msg) => crate::ApiError::conflict(msg),
            ServiceError::MemberLimitReached => crate::ApiError::unauthorized(MEMBER_LIMIT_MESSAGE),
            ServiceError::InsufficientCredits => {
                crate::ApiError::new(StatusCode::PAYMENT_REQUIRED, "Team has no credits left")
            }
            ServiceError::AssistantUnavailable => crate::ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "AI backend is not configured",
            ),
            ServiceError::Assistant(assistant_err) => {
                tracing::error!("Assistant error: {}", assistant_err);
                crate::ApiError::new(StatusCode::BAD_GATEWAY, "AI backend request failed")
            }
            ServiceError::Mail(mail_err) => {
                tracing::error!("Mail error: {}", mail_err);
                crate::ApiError::internal_server_error("Failed to send email")
            }
            ServiceError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                crate::ApiError::internal_server_error("Database operation failed")
            }
            ServiceError::Auth(auth_err) => crate::ApiError::from(auth_err),
            ServiceError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                crate::ApiError::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<TeamError> for ServiceError {
    fn from(err: TeamError) -> Self {
        match err {
            TeamError::TeamNotFound => Self::not_found("Team not found"),
            TeamError::UserNotFound => Self::not_found("User not found"),
            TeamError::SessionNotFound => Self::not_found("Chat session not found"),
            TeamError::TeamFull { .. } => Self::MemberLimitReached,
            TeamError::InsufficientCredits => Self::InsufficientCredits,
            TeamError::DatabaseError(db_err) => Self::Database(db_err.to_string()),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<MailError> for ServiceError {
    fn from(err: MailError) -> Self {
        Self::Mail(err)
    }
}

impl From<AssistantError> for ServiceError {
    fn from(err: AssistantError) -> Self {
        Self::Assistant(err)
    }
}
