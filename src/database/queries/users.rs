use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User};
use crate::database::repository::Repository;

impl Repository<User> {
    pub async fn create(&self, new: &NewUser) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, phone, bio)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, email, phone, bio, role, is_active, created_at, updated_at",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.bio)
        .fetch_one(self.pool())
        .await?;
        Ok(user)
    }
}
