use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "aeos.toml",
    "config/aeos.toml",
    "crates/config/aeos.toml",
    "../aeos.toml",
    "../config/aeos.toml",
];

/// Environment variables holding the SMTP account, kept for deployments that
/// predate the `AEOS__MAIL__*` convention.
pub const MAIL_USER_ENV: &str = "EMAIL";
pub const MAIL_PASSWORD_ENV: &str = "PASSWORD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub teams: TeamsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://aeos.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
        }
    }
}

impl AuthConfig {
    fn default_session_ttl() -> u64 {
        86_400
    }
}

/// SMTP settings used to deliver team invitations.
///
/// ```
/// use aeos_config::MailConfig;
///
/// let mail = MailConfig::default();
/// assert_eq!(mail.host, "smtp.gmail.com");
/// assert_eq!(mail.port, 465);
/// assert!(mail.username.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    /// Plain TLS from the first byte. When false the transport upgrades with STARTTLS.
    pub implicit_tls: bool,
    pub from: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Link prefix placed in invitation emails; the team token is appended.
    pub accept_base_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            implicit_tls: true,
            from: "AeosGPT <no-reply@aeos-gpt.app>".to_string(),
            username: None,
            password: None,
            accept_base_url: "https://aeos-gpt.vercel.app/accept-invitation".to_string(),
        }
    }
}

/// Connection settings for the OpenAI-compatible completion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub request_timeout_seconds: u64,
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            request_timeout_seconds: 30,
            system_prompt: "You are Aeos, a helpful assistant for small teams.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamsConfig {
    pub member_limit: i64,
    pub default_credits: i64,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            member_limit: 5,
            default_credits: 100,
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use aeos_config::load;
///
/// std::env::remove_var("AEOS_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let db_max = i64::from(defaults.database.max_connections);
    let session_ttl_i64 = i64::try_from(defaults.auth.session_ttl_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())
        .context("invalid default for http.address")?
        .set_default("http.port", i64::from(defaults.http.port))
        .context("invalid default for http.port")?
        .set_default("database.url", defaults.database.url.clone())
        .context("invalid default for database.url")?
        .set_default("database.max_connections", db_max)
        .context("invalid default for database.max_connections")?
        .set_default("auth.session_ttl_seconds", session_ttl_i64)
        .context("invalid default for auth.session_ttl_seconds")?;

    let environment_overrides = config::Environment::with_prefix("AEOS").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("AEOS_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via AEOS_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }

    apply_mail_credentials(&mut config.mail);

    debug!(
        http = ?config.http,
        database = %config.database.url,
        smtp_host = %config.mail.host,
        model = %config.assistant.model,
        "loaded backend configuration"
    );
    Ok(config)
}

fn apply_mail_credentials(mail: &mut MailConfig) {
    if let Ok(user) = std::env::var(MAIL_USER_ENV) {
        if !user.is_empty() {
            mail.username = Some(user);
        }
    }
    if let Ok(pass) = std::env::var(MAIL_PASSWORD_ENV) {
        if !pass.is_empty() {
            mail.password = Some(pass);
        }
    }
}
