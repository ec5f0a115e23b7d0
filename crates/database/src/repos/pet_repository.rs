use crate::entities::Pet;
use crate::types::DatabaseResult;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

/// Append-only registry of pets and their owners.
#[derive(Clone)]
pub struct PetRepository {
    pool: SqlitePool,
}

impl PetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, name: &str, owner: &str) -> DatabaseResult<Pet> {
        let now = Utc::now().to_rfc3339();

        let id = sqlx::query("INSERT INTO pets (name, owner, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(owner)
            .bind(&now)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!(pet_id = id, "inserted pet row");

        Ok(Pet {
            id,
            name: name.to_string(),
            owner: owner.to_string(),
            created_at: now,
        })
    }

    pub async fn list(&self) -> DatabaseResult<Vec<Pet>> {
        let pets = sqlx::query_as::<_, Pet>("SELECT id, name, owner, created_at FROM pets ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(pets)
    }
}
