//! Bulk deletion of one collection by identifier list.
//!
//! A request names the ids and a [`Strategy`]; [`BulkDeleteEngine`] runs the
//! matching policy against an injected [`RecordStore`](crate::database::RecordStore)
//! and returns a [`BulkDeleteOutcome`], which renders itself as the HTTP response.

pub mod engine;
pub mod identifier;
pub mod outcome;
pub mod request;

use std::time::Duration;

use thiserror::Error;

use crate::database::manager::DatabaseError;

pub use engine::{BulkDeleteEngine, EngineOptions};
pub use outcome::{BulkDeleteOutcome, FailureBreakdown, PartialOutcome, DELETED_MESSAGE};
pub use request::{BulkDeletePayload, DeletionRequest, Strategy};

#[derive(Debug, Error)]
pub enum BulkDeleteError {
    #[error("ids must be a non-empty array")]
    EmptyRequest,

    #[error("unknown strategy '{0}'; expected atomic, partial or best_effort")]
    UnknownStrategy(String),

    #[error("invalid id format: {0}")]
    InvalidIdentifier(String),

    #[error("no matching records found")]
    NoMatchingRecords,

    #[error("only {matched} of {requested} records matched; nothing deleted")]
    IncompleteMatch { requested: usize, matched: u64 },

    #[error("bulk delete timed out after {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}
