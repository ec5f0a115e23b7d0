//! Password accounts and bearer session tokens.
//!
//! Users live in `users`, their argon2 hash in `user_identities` under the
//! `password` provider, and issued tokens in `sessions`.

mod password;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use rand::RngCore;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use aeos_config::AuthConfig;
use thiserror::Error;
use tracing::{debug, info};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Longer configured lifetimes are clamped so expiry stays a four-digit year.
pub const MAX_SESSION_TTL_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

const TOKEN_BYTES: usize = 32;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    UserExists,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid session token")]
    InvalidSession,
}

/// The account behind a session. `id` stays server-side; clients see `public_id`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct IdentityRow {
    user_id: i64,
    secret: String,
}

#[derive(FromRow)]
struct SessionRow {
    user_id: i64,
    expires_at: String,
}

/// Canonical form used for storing and looking up email addresses.
///
/// ```
/// assert_eq!(aeos_auth::normalize_email("  Ada@Example.COM "), "ada@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    session_ttl: Duration,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: AuthConfig) -> Self {
        let seconds = config.session_ttl_seconds.min(MAX_SESSION_TTL_SECONDS) as i64;
        Self {
            pool,
            session_ttl: Duration::try_seconds(seconds).unwrap_or(Duration::zero()),
        }
    }

    /// Create an account and its password identity in one transaction.
    pub async fn register_with_password(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let secret = password::hash(password)?;
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            return Err(AuthError::UserExists);
        }

        let user = insert_user(&mut *tx, &email, display_name, &now).await?;

        sqlx::query(
            "INSERT INTO user_identities (user_id, provider, provider_uid, secret, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(password::PROVIDER)
        .bind(&email)
        .bind(&secret)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(user = %user.public_id, "registered password account");
        Ok(user)
    }

    /// Check the password and issue a fresh session token.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, AuthSession), AuthError> {
        let identity: IdentityRow = sqlx::query_as(
            "SELECT user_id, secret FROM user_identities WHERE provider = ? AND provider_uid = ?",
        )
        .bind(password::PROVIDER)
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        password::verify(password, &identity.secret)?;

        let user = self.load_user(identity.user_id).await?;
        let session = self.issue_session(user.id).await?;
        debug!(user = %user.public_id, expires_at = %session.expires_at, "issued session");
        Ok((user, session))
    }

    /// Resolve a bearer token. Expired tokens are deleted on sight.
    pub async fn authenticate_token(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidSession);
        }

        let row: SessionRow =
            sqlx::query_as("SELECT user_id, expires_at FROM sessions WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(AuthError::SessionNotFound)?;

        let expires_at = DateTime::parse_from_rfc3339(&row.expires_at)
            .map_err(|_| AuthError::InvalidSession)?
            .with_timezone(&Utc);

        if expires_at <= Utc::now() {
            self.revoke_session(token).await?;
            debug!(user_id = row.user_id, "rejected expired session");
            return Err(AuthError::SessionExpired);
        }

        let user = self.load_user(row.user_id).await?;
        Ok((
            user,
            AuthSession {
                token: token.to_owned(),
                user_id: row.user_id,
                expires_at,
            },
        ))
    }

    pub async fn revoke_session(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete every session past its expiry. Returns how many were removed.
    pub async fn prune_expired_sessions(&self) -> Result<u64, AuthError> {
        let removed = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if removed > 0 {
            info!(removed, "pruned expired sessions");
        }
        Ok(removed)
    }

    async fn load_user(&self, id: i64) -> Result<User, AuthError> {
        sqlx::query_as("SELECT id, public_id, email, display_name FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AuthError::InvalidSession)
    }

    async fn issue_session(&self, user_id: i64) -> Result<AuthSession, AuthError> {
        let now = Utc::now();
        let session = AuthSession {
            token: new_session_token(),
            user_id,
            expires_at: now + self.session_ttl,
        };

        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&session.token)
        .bind(now.to_rfc3339())
        .bind(session.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(session)
    }
}

async fn insert_user(
    conn: &mut SqliteConnection,
    email: &str,
    display_name: Option<&str>,
    now: &str,
) -> Result<User, AuthError> {
    let public_id = CUID.create_id();

    let id = sqlx::query(
        "INSERT INTO users (public_id, email, display_name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&public_id)
    .bind(email)
    .bind(display_name)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(User {
        id,
        public_id,
        email: Some(email.to_owned()),
        display_name: display_name.map(str::to_owned),
    })
}

fn new_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
