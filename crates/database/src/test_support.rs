//! Temporary databases for tests in this and dependent crates.

use crate::entities::{CreateTeamRequest, Team, User};
use crate::migrations::MIGRATOR;
use crate::repos::{TeamRepository, UserRepository};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::time::Duration;
use tempfile::TempDir;

/// A migrated SQLite database living in a temp directory for the lifetime of the value.
pub struct TestDatabase {
    pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub async fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let options = SqliteConnectOptions::new()
            .filename(temp_dir.path().join("aeos-test.db"))
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        Ok(Self {
            pool,
            _temp_dir: temp_dir,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn user(&self, email: &str, display_name: &str) -> anyhow::Result<User> {
        Ok(UserRepository::new(self.pool.clone())
            .create(email, Some(display_name))
            .await?)
    }

    pub async fn team(&self, name: &str, owner_id: i64, credits: i64) -> anyhow::Result<Team> {
        Ok(TeamRepository::new(self.pool.clone())
            .create(&CreateTeamRequest {
                name: name.to_string(),
                owner_id,
                balance_credits: credits,
            })
            .await?)
    }

    /// Insert a membership directly, bypassing the member cap.
    pub async fn add_member(&self, team_id: i64, user_id: i64) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO memberships (team_id, user_id, joined_at) VALUES (?, ?, ?)")
            .bind(team_id)
            .bind(user_id)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
