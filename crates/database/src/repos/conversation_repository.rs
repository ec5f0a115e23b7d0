//! Repository for conversation turns.

use crate::entities::{Conversation, CreateConversationRequest};
use crate::repos::team_repository::consume_credit_in;
use crate::types::TeamResult;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

#[derive(Clone)]
pub struct ConversationRepository {
    pool: SqlitePool,
}

impl ConversationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// History of a session in the order the exchanges happened.
    pub async fn list_for_session(&self, session_id: i64) -> TeamResult<Vec<Conversation>> {
        let conversations = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, session_id, user_prompt, generated_result, created_at
            FROM conversations
            WHERE session_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    /// Store an exchange and charge the owning team one credit. Nothing is
    /// written when the team has run out of credits.
    pub async fn record_charged(
        &self,
        request: &CreateConversationRequest,
    ) -> TeamResult<(Conversation, i64)> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let remaining = consume_credit_in(&mut tx, request.team_id).await?;

        let id = sqlx::query(
            "INSERT INTO conversations (session_id, user_prompt, generated_result, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(request.session_id)
        .bind(&request.user_prompt)
        .bind(&request.generated_result)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        info!(
            conversation_id = id,
            session_id = request.session_id,
            team_id = request.team_id,
            remaining_credits = remaining,
            "recorded conversation"
        );

        Ok((
            Conversation {
                id,
                session_id: request.session_id,
                user_prompt: request.user_prompt.clone(),
                generated_result: request.generated_result.clone(),
                created_at: now,
            },
            remaining,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CreateChatSessionRequest;
    use crate::repos::ChatSessionRepository;
    use crate::test_support::TestDatabase;
    use crate::types::TeamError;

    #[tokio::test]
    async fn record_charged_keeps_order_and_charges_team() {
        let db = TestDatabase::new().await.unwrap();
        let owner = db.user("owner@example.com", "Owner").await.unwrap();
        let team = db.team("Writers", owner.id, 2).await.unwrap();
        let session = ChatSessionRepository::new(db.pool().clone())
            .create(&CreateChatSessionRequest {
                team_id: team.id,
                title: "Drafts".into(),
            })
            .await
            .unwrap();
        let repo = ConversationRepository::new(db.pool().clone());

        for (prompt, answer) in [("first", "one"), ("second", "two")] {
            repo.record_charged(&CreateConversationRequest {
                session_id: session.id,
                team_id: team.id,
                user_prompt: prompt.into(),
                generated_result: answer.into(),
            })
            .await
            .unwrap();
        }

        let history = repo.list_for_session(session.id).await.unwrap();
        let prompts: Vec<_> = history.iter().map(|c| c.user_prompt.as_str()).collect();
        assert_eq!(prompts, ["first", "second"]);

        let broke = repo
            .record_charged(&CreateConversationRequest {
                session_id: session.id,
                team_id: team.id,
                user_prompt: "third".into(),
                generated_result: "three".into(),
            })
            .await;
        assert!(matches!(broke, Err(TeamError::InsufficientCredits)));
        assert_eq!(repo.list_for_session(session.id).await.unwrap().len(), 2);
    }
}
