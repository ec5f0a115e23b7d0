use std::sync::Arc;

use aeos_assistant::CompletionProvider;
use aeos_auth::{Authenticator, User};
use aeos_config::AppConfig;
use aeos_mailer::Mailer;
use axum::http::HeaderMap;
use sqlx::SqlitePool;

use crate::{util::require_session_token, ApiError};

/// Tunables the handlers need from the loaded configuration.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub member_limit: i64,
    pub default_credits: i64,
    pub accept_base_url: String,
    pub session_ttl_seconds: u64,
}

impl ApiSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            member_limit: config.teams.member_limit,
            default_credits: config.teams.default_credits,
            accept_base_url: config.mail.accept_base_url.clone(),
            session_ttl_seconds: config.auth.session_ttl_seconds,
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    authenticator: Authenticator,
    mailer: Arc<dyn Mailer>,
    assistant: Option<Arc<dyn CompletionProvider>>,
    settings: Arc<ApiSettings>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        authenticator: Authenticator,
        mailer: Arc<dyn Mailer>,
        assistant: Option<Arc<dyn CompletionProvider>>,
        settings: ApiSettings,
    ) -> Self {
        Self {
            pool,
            authenticator,
            mailer,
            assistant,
            settings: Arc::new(settings),
        }
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    pub fn assistant(&self) -> Option<&dyn CompletionProvider> {
        self.assistant.as_deref()
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Resolve the caller from the bearer token or session cookie.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<User, ApiError> {
        let token = require_session_token(headers)?;
        let (user, _) = self
            .authenticator
            .authenticate_token(&token)
            .await
            .map_err(ApiError::from)?;
        Ok(user)
    }
}
