use sqlx::{self, postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::Collection;

/// Single-record access to one collection. Entity-specific statements live in
/// `impl Repository<Entity>` blocks next to each model's queries.
pub struct Repository<T> {
    collection: Collection,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(collection: Collection, pool: PgPool) -> Self {
        Self {
            collection,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM \"{}\" WHERE id = $1", self.collection.table_name());
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, DatabaseError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", self.singular(), id)))
    }

    /// Delete one row; `NotFound` when nothing matched
    pub async fn delete_one(&self, id: Uuid) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE id = $1", self.collection.table_name());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("{} {} not found", self.singular(), id)));
        }
        Ok(())
    }

    fn singular(&self) -> &'static str {
        match self.collection {
            Collection::Restaurants => "restaurant",
            Collection::Users => "user",
            Collection::Positions => "position",
        }
    }
}
