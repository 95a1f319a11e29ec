use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Position, PositionInput};
use crate::database::repository::Repository;

impl Repository<Position> {
    pub async fn create(&self, input: &PositionInput) -> Result<Position, DatabaseError> {
        let position = sqlx::query_as::<_, Position>(
            "INSERT INTO positions (title)
             VALUES ($1)
             RETURNING id, title, created_at, updated_at",
        )
        .bind(&input.title)
        .fetch_one(self.pool())
        .await?;
        Ok(position)
    }

    pub async fn update(&self, id: Uuid, input: &PositionInput) -> Result<Position, DatabaseError> {
        sqlx::query_as::<_, Position>(
            "UPDATE positions
             SET title = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING id, title, created_at, updated_at",
        )
        .bind(&input.title)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("position {} not found", id)))
    }
}
