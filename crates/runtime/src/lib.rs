use std::sync::Arc;

use aeos_assistant::{AssistantError, CompletionProvider, OpenAiCompatible};
use aeos_auth::Authenticator;
use aeos_config::AppConfig;
use aeos_database::initialize_database;
use aeos_mailer::{Mailer, SmtpMailer};
use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub mailer: Arc<dyn Mailer>,
    /// `None` when no API key is configured; AI responses then answer 503.
    pub assistant: Option<Arc<dyn CompletionProvider>>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), config.auth.clone());
        authenticator
            .prune_expired_sessions()
            .await
            .context("failed to prune expired sessions")?;

        let mailer: Arc<dyn Mailer> = Arc::new(
            SmtpMailer::from_config(&config.mail).context("failed to configure SMTP mailer")?,
        );
        if config.mail.username.is_none() {
            warn!(host = %config.mail.host, "no SMTP credentials configured, delivery may be refused");
        }

        let assistant: Option<Arc<dyn CompletionProvider>> =
            match OpenAiCompatible::from_config(&config.assistant) {
                Ok(provider) => {
                    info!(model = %provider.model(), base_url = %config.assistant.base_url, "assistant ready");
                    Some(Arc::new(provider))
                }
                Err(AssistantError::ApiKeyMissing) => {
                    warn!("no assistant API key configured, AI responses are disabled");
                    None
                }
                Err(error) => {
                    return Err(error).context("failed to configure assistant");
                }
            };

        info!(
            mailer = mailer.transport_name(),
            member_limit = config.teams.member_limit,
            "backend services ready"
        );

        Ok(Self {
            db_pool,
            authenticator,
            mailer,
            assistant,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
