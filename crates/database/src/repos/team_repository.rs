//! Repository for teams and their credit balance.

use crate::entities::{CreateTeamRequest, Team};
use crate::types::{TeamError, TeamResult};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use sqlx::SqlitePool;
use tracing::{debug, info};

const TEAM_TOKEN_LEN: usize = 32;

#[derive(Clone)]
pub struct TeamRepository {
    pool: SqlitePool,
}

impl TeamRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a team and make its owner the first member, in one transaction.
    pub async fn create(&self, request: &CreateTeamRequest) -> TeamResult<Team> {
        let now = Utc::now().to_rfc3339();
        let token = generate_team_token();

        let mut tx = self.pool.begin().await?;

        let team_id = sqlx::query(
            "INSERT INTO teams (name, token, balance_credits, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&request.name)
        .bind(&token)
        .bind(request.balance_credits)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("INSERT INTO memberships (team_id, user_id, joined_at) VALUES (?, ?, ?)")
            .bind(team_id)
            .bind(request.owner_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(team_id, owner_id = request.owner_id, name = %request.name, "created team");

        Ok(Team {
            id: team_id,
            name: request.name.clone(),
            token,
            balance_credits: request.balance_credits,
            created_at: now,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> TeamResult<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(
            "SELECT id, name, token, balance_credits, created_at FROM teams WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(team)
    }

    pub async fn find_by_token(&self, token: &str) -> TeamResult<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(
            "SELECT id, name, token, balance_credits, created_at FROM teams WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(team)
    }

    /// Teams the user belongs to, oldest membership first.
    pub async fn list_for_user(&self, user_id: i64) -> TeamResult<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.id, t.name, t.token, t.balance_credits, t.created_at
            FROM teams t
            JOIN memberships m ON m.team_id = t.id
            WHERE m.user_id = ?
            ORDER BY m.joined_at ASC, t.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }

    /// Take one credit from the team. Fails without touching the balance when
    /// it is already zero.
    pub async fn consume_credit(&self, team_id: i64) -> TeamResult<i64> {
        let mut tx = self.pool.begin().await?;
        let remaining = consume_credit_in(&mut tx, team_id).await?;
        tx.commit().await?;
        Ok(remaining)
    }
}

pub(crate) async fn consume_credit_in(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    team_id: i64,
) -> TeamResult<i64> {
    let updated = sqlx::query(
        "UPDATE teams SET balance_credits = balance_credits - 1 WHERE id = ? AND balance_credits > 0",
    )
    .bind(team_id)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    let remaining: Option<i64> =
        sqlx::query_scalar("SELECT balance_credits FROM teams WHERE id = ?")
            .bind(team_id)
            .fetch_optional(&mut **tx)
            .await?;

    match (updated, remaining) {
        (_, None) => Err(TeamError::TeamNotFound),
        (0, Some(_)) => Err(TeamError::InsufficientCredits),
        (_, Some(remaining)) => {
            debug!(team_id, remaining, "consumed team credit");
            Ok(remaining)
        }
    }
}

fn generate_team_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TEAM_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDatabase;

    #[tokio::test]
    async fn create_team_adds_owner_as_member() {
        let db = TestDatabase::new().await.unwrap();
        let owner = db.user("owner@example.com", "Owner").await.unwrap();
        let repo = TeamRepository::new(db.pool().clone());

        let team = repo
            .create(&CreateTeamRequest {
                name: "Rockets".into(),
                owner_id: owner.id,
                balance_credits: 3,
            })
            .await
            .unwrap();

        assert_eq!(team.token.len(), TEAM_TOKEN_LEN);
        let teams = repo.list_for_user(owner.id).await.unwrap();
        assert_eq!(teams, vec![team.clone()]);
        assert_eq!(repo.find_by_token(&team.token).await.unwrap(), Some(team));
    }

    #[tokio::test]
    async fn consume_credit_stops_at_zero() {
        let db = TestDatabase::new().await.unwrap();
        let owner = db.user("owner@example.com", "Owner").await.unwrap();
        let team = db.team("Tiny", owner.id, 1).await.unwrap();
        let repo = TeamRepository::new(db.pool().clone());

        assert_eq!(repo.consume_credit(team.id).await.unwrap(), 0);
        assert!(matches!(
            repo.consume_credit(team.id).await,
            Err(TeamError::InsufficientCredits)
        ));
        assert!(matches!(
            repo.consume_credit(team.id + 100).await,
            Err(TeamError::TeamNotFound)
        ));
    }
}
