use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use aeos_auth::AuthError;
use serde::Serialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

/// Body of most failed requests: `{ "error": "..." }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body used by the invitation endpoints: `{ "message": "..." }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorField {
    #[default]
    Error,
    Message,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub field: ErrorField,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            field: ErrorField::Error,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Render as `{ "message": ... }`. Server-side failures collapse to a
    /// fixed text so nothing internal reaches the caller.
    pub fn into_message_body(mut self) -> Self {
        if self.status.is_server_error() {
            self.message = "Internal server error".to_string();
        }
        self.field = ErrorField::Message;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.field {
            ErrorField::Error => json!({ "error": self.message }),
            ErrorField::Message => json!({ "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::SessionNotFound | AuthError::SessionExpired | AuthError::InvalidSession => {
                Self::unauthorized("Unauthorized")
            }
            AuthError::InvalidCredentials => Self::unauthorized(error.to_string()),
            AuthError::UserExists | AuthError::InvalidEmail | AuthError::WeakPassword => {
                Self::bad_request(error.to_string())
            }
            AuthError::Database(_) | AuthError::PasswordHash(_) => {
                error!(error = ?error, "auth error");
                Self::internal_server_error("Authentication failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn default_body_uses_error_field() {
        let (status, body) = body_json(ApiError::bad_request("nope")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "nope" }));
    }

    #[tokio::test]
    async fn message_body_hides_server_errors() {
        let error = ApiError::internal_server_error("disk on fire").into_message_body();
        let (status, body) = body_json(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal server error" }));
    }

    #[tokio::test]
    async fn message_body_keeps_client_errors() {
        let error = ApiError::unauthorized("Unauthorized").into_message_body();
        let (_, body) = body_json(error).await;
        assert_eq!(body, json!({ "message": "Unauthorized" }));
    }

    #[test]
    fn expired_sessions_are_unauthorized() {
        let error = ApiError::from(AuthError::SessionExpired);
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.message, "Unauthorized");
    }
}
