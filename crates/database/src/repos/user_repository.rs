//! User repository for database operations.

use crate::entities::User;
use crate::types::TeamResult;
use chrono::Utc;
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use sqlx::SqlitePool;
use tracing::info;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

const USER_COLUMNS: &str = "id, public_id, email, display_name, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> TeamResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Emails are matched exactly, the way they were stored at registration.
    pub async fn find_by_email(&self, email: &str) -> TeamResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Insert a user without credentials. Used for seeding and invitations of
    /// people who have not registered a password yet.
    pub async fn create(&self, email: &str, display_name: Option<&str>) -> TeamResult<User> {
        let now = Utc::now().to_rfc3339();
        let public_id = CUID.create_id();

        let id = sqlx::query(
            "INSERT INTO users (public_id, email, display_name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(email)
        .bind(display_name)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(user_id = id, %public_id, "created user");

        Ok(User {
            id,
            public_id,
            email: Some(email.to_string()),
            display_name: display_name.map(str::to_string),
            created_at: now.clone(),
            updated_at: now,
        })
    }
}
