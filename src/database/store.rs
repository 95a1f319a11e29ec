use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// A homogeneous table of records keyed by UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Restaurants,
    Users,
    Positions,
}

impl Collection {
    /// Table name. Only ever one of these literals, so it is safe to splice into SQL.
    pub fn table_name(self) -> &'static str {
        match self {
            Collection::Restaurants => "restaurants",
            Collection::Users => "users",
            Collection::Positions => "positions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Set-oriented access to one collection, as needed by the bulk delete engine.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn collection(&self) -> Collection;

    /// Open a transactional scope. Dropping the scope without committing rolls it back.
    async fn begin(&self) -> Result<Box<dyn StoreScope>, DatabaseError>;

    /// Delete every row whose key is in `ids` as one statement outside any explicit scope.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, DatabaseError>;
}

/// Statements issued through a scope commit or roll back together.
#[async_trait]
pub trait StoreScope: Send {
    /// Subset of `ids` that currently label a live row, as seen by this scope.
    async fn probe(&mut self, ids: &[Uuid]) -> Result<HashSet<Uuid>, DatabaseError>;

    /// Delete every row whose key is in `ids`; returns rows removed.
    async fn delete_many(&mut self, ids: &[Uuid]) -> Result<u64, DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}
