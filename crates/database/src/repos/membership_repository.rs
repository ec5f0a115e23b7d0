//! Repository for team memberships.
//!
//! The member cap is enforced by the insert itself: the row is only written
//! when the team is still below the limit at the moment SQLite executes the
//! statement, so two concurrent joins cannot both take the last seat.

use crate::entities::{JoinOutcome, Membership};
use crate::types::{TeamError, TeamResult};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

#[derive(Clone)]
pub struct MembershipRepository {
    pool: SqlitePool,
}

impl MembershipRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn count_for_team(&self, team_id: i64) -> TeamResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM memberships WHERE team_id = ?")
            .bind(team_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn find(&self, team_id: i64, user_id: i64) -> TeamResult<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(
            "SELECT id, team_id, user_id, joined_at FROM memberships WHERE team_id = ? AND user_id = ?",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    pub async fn is_member(&self, team_id: i64, user_id: i64) -> TeamResult<bool> {
        Ok(self.find(team_id, user_id).await?.is_some())
    }

    pub async fn list_for_team(&self, team_id: i64) -> TeamResult<Vec<Membership>> {
        let members = sqlx::query_as::<_, Membership>(
            "SELECT id, team_id, user_id, joined_at FROM memberships WHERE team_id = ? ORDER BY joined_at ASC, id ASC",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Add `user_id` to the team unless that would exceed `limit` members.
    pub async fn join_within_limit(
        &self,
        team_id: i64,
        user_id: i64,
        limit: i64,
    ) -> TeamResult<JoinOutcome> {
        if let Some(existing) = self.find(team_id, user_id).await? {
            return Ok(JoinOutcome::AlreadyMember(existing));
        }

        let now = Utc::now().to_rfc3339();

        let inserted = sqlx::query(
            r#"
            INSERT INTO memberships (team_id, user_id, joined_at)
            SELECT ?, ?, ?
            WHERE (SELECT COUNT(*) FROM memberships WHERE team_id = ?) < ?
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(&now)
        .bind(team_id)
        .bind(limit)
        .execute(&self.pool)
        .await;

        let rows = match inserted {
            Ok(result) => result.rows_affected(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // Lost a race against a concurrent join of the same user.
                let existing = self
                    .find(team_id, user_id)
                    .await?
                    .ok_or(TeamError::UserNotFound)?;
                return Ok(JoinOutcome::AlreadyMember(existing));
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                return Err(TeamError::TeamNotFound);
            }
            Err(other) => return Err(other.into()),
        };

        if rows == 0 {
            warn!(team_id, user_id, limit, "team is full, membership rejected");
            return Ok(JoinOutcome::TeamFull { limit });
        }

        let membership = self
            .find(team_id, user_id)
            .await?
            .ok_or(TeamError::UserNotFound)?;

        info!(team_id, user_id, "user joined team");
        Ok(JoinOutcome::Joined(membership))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDatabase;

    #[tokio::test]
    async fn join_respects_limit() {
        let db = TestDatabase::new().await.unwrap();
        let owner = db.user("owner@example.com", "Owner").await.unwrap();
        let team = db.team("Capped", owner.id, 0).await.unwrap();
        let repo = MembershipRepository::new(db.pool().clone());

        let second = db.user("second@example.com", "Second").await.unwrap();
        let third = db.user("third@example.com", "Third").await.unwrap();

        assert!(matches!(
            repo.join_within_limit(team.id, second.id, 2).await.unwrap(),
            JoinOutcome::Joined(_)
        ));
        assert_eq!(
            repo.join_within_limit(team.id, third.id, 2).await.unwrap(),
            JoinOutcome::TeamFull { limit: 2 }
        );
        assert_eq!(repo.count_for_team(team.id).await.unwrap(), 2);
        assert!(!repo.is_member(team.id, third.id).await.unwrap());
    }

    #[tokio::test]
    async fn join_twice_is_idempotent() {
        let db = TestDatabase::new().await.unwrap();
        let owner = db.user("owner@example.com", "Owner").await.unwrap();
        let team = db.team("Repeat", owner.id, 0).await.unwrap();
        let repo = MembershipRepository::new(db.pool().clone());

        let outcome = repo.join_within_limit(team.id, owner.id, 5).await.unwrap();
        assert!(matches!(outcome, JoinOutcome::AlreadyMember(m) if m.user_id == owner.id));
        assert_eq!(repo.count_for_team(team.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_joins_never_exceed_limit() {
        let db = TestDatabase::new().await.unwrap();
        let owner = db.user("owner@example.com", "Owner").await.unwrap();
        let team = db.team("Crowded", owner.id, 0).await.unwrap();
        let repo = MembershipRepository::new(db.pool().clone());

        let mut candidates = Vec::new();
        for i in 0..10 {
            candidates.push(db.user(&format!("user{i}@example.com"), "Candidate").await.unwrap());
        }

        let mut handles = Vec::new();
        for candidate in candidates {
            let repo = repo.clone();
            let team_id = team.id;
            handles.push(tokio::spawn(async move {
                repo.join_within_limit(team_id, candidate.id, 5).await
            }));
        }

        let mut joined = 0;
        for handle in handles {
            if let JoinOutcome::Joined(_) = handle.await.unwrap().unwrap() {
                joined += 1;
            }
        }

        assert_eq!(joined, 4);
        assert_eq!(repo.count_for_team(team.id).await.unwrap(), 5);
    }
}
