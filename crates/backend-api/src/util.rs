use axum::{
    extract::rejection::JsonRejection,
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap,
    },
    Json,
};

use crate::ApiError;

pub const SESSION_COOKIE: &str = "aeos_session";

/// Session token from `Authorization: Bearer` or, failing that, the
/// `aeos_session` cookie set at login.
pub fn require_session_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(value) = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
    {
        let mut parts = value.split_whitespace();
        let scheme = parts.next().unwrap_or("");
        let token = parts.next().unwrap_or("");
        if scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty() {
            return Ok(token.to_string());
        }
    }

    session_cookie(headers).ok_or_else(|| ApiError::unauthorized("Unauthorized"))
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Unwrap a JSON body whose rejection was deferred until after the caller
/// was authenticated.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))
}

pub fn session_cookie_header(token: &str, max_age_seconds: u64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age_seconds}")
}
