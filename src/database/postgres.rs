use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Collection, RecordStore, StoreScope};

/// `RecordStore` over a Postgres table
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
    collection: Collection,
}

impl PgRecordStore {
    pub fn new(pool: PgPool, collection: Collection) -> Self {
        Self { pool, collection }
    }
}

fn delete_sql(collection: Collection) -> String {
    format!("DELETE FROM \"{}\" WHERE id = ANY($1)", collection.table_name())
}

fn probe_sql(collection: Collection) -> String {
    format!("SELECT id FROM \"{}\" WHERE id = ANY($1)", collection.table_name())
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn collection(&self) -> Collection {
        self.collection
    }

    async fn begin(&self) -> Result<Box<dyn StoreScope>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgScope {
            tx,
            collection: self.collection,
        }))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, DatabaseError> {
        let result = sqlx::query(&delete_sql(self.collection))
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// One open Postgres transaction. sqlx rolls it back on drop unless committed.
pub struct PgScope {
    tx: Transaction<'static, Postgres>,
    collection: Collection,
}

#[async_trait]
impl StoreScope for PgScope {
    async fn probe(&mut self, ids: &[Uuid]) -> Result<HashSet<Uuid>, DatabaseError> {
        let rows: Vec<Uuid> = sqlx::query_scalar(&probe_sql(self.collection))
            .bind(ids)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().collect())
    }

    async fn delete_many(&mut self, ids: &[Uuid]) -> Result<u64, DatabaseError> {
        let result = sqlx::query(&delete_sql(self.collection))
            .bind(ids)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
