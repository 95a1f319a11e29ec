use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

use super::Strategy;
use crate::middleware::ApiResponse;

pub const DELETED_MESSAGE: &str = "deleted successfully";

/// Why an id was not removed by a partial delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailureBreakdown {
    pub malformed: Vec<String>,
    pub not_found: Vec<String>,
}

/// Per-identifier accounting of a partial delete.
///
/// Built only through [`PartialOutcome::new`], so the counts always match the
/// id lists and no id is both deleted and failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialOutcome {
    pub deleted_count: usize,
    pub failed_count: usize,
    pub deleted_ids: Vec<String>,
    pub failed_ids: Vec<String>,
    pub failures: FailureBreakdown,
}

impl PartialOutcome {
    /// Inputs must be disjoint and duplicate-free; `identifier::partition` guarantees both.
    pub fn new(deleted: Vec<Uuid>, malformed: Vec<String>, not_found: Vec<Uuid>) -> Self {
        let deleted_ids: Vec<String> = deleted.iter().map(Uuid::to_string).collect();
        let not_found: Vec<String> = not_found.iter().map(Uuid::to_string).collect();
        let failed_ids: Vec<String> = malformed.iter().chain(not_found.iter()).cloned().collect();

        Self {
            deleted_count: deleted_ids.len(),
            failed_count: failed_ids.len(),
            deleted_ids,
            failed_ids,
            failures: FailureBreakdown {
                malformed,
                not_found,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match (self.deleted_count, self.failed_count) {
            (0, _) => StatusCode::NOT_FOUND,
            (_, 0) => StatusCode::OK,
            _ => StatusCode::PARTIAL_CONTENT,
        }
    }
}

/// What a successful strategy run reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkDeleteOutcome {
    Atomic { deleted_count: u64 },
    Partial(PartialOutcome),
    BestEffort { deleted_count: u64 },
}

impl BulkDeleteOutcome {
    pub fn strategy(&self) -> Strategy {
        match self {
            BulkDeleteOutcome::Atomic { .. } => Strategy::Atomic,
            BulkDeleteOutcome::Partial(_) => Strategy::Partial,
            BulkDeleteOutcome::BestEffort { .. } => Strategy::BestEffort,
        }
    }

    pub fn deleted_count(&self) -> u64 {
        match self {
            BulkDeleteOutcome::Atomic { deleted_count }
            | BulkDeleteOutcome::BestEffort { deleted_count } => *deleted_count,
            BulkDeleteOutcome::Partial(outcome) => outcome.deleted_count as u64,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BulkDeleteOutcome::Partial(outcome) => outcome.status(),
            BulkDeleteOutcome::Atomic { .. } | BulkDeleteOutcome::BestEffort { .. } => {
                StatusCode::OK
            }
        }
    }

    pub fn into_api_response(self) -> ApiResponse {
        let status = self.status();
        match self {
            BulkDeleteOutcome::Atomic { deleted_count }
            | BulkDeleteOutcome::BestEffort { deleted_count } => ApiResponse::with_status(status)
                .field("message", DELETED_MESSAGE)
                .field("deleted_count", deleted_count),
            BulkDeleteOutcome::Partial(outcome) => ApiResponse::with_status(status).merge(outcome),
        }
    }
}

impl IntoResponse for BulkDeleteOutcome {
    fn into_response(self) -> Response {
        self.into_api_response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_counts_match_id_lists() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let outcome = PartialOutcome::new(vec![a], vec!["nope".to_string()], vec![b]);

        assert_eq!(outcome.deleted_count, 1);
        assert_eq!(outcome.failed_count, 2);
        assert_eq!(outcome.deleted_ids, vec![a.to_string()]);
        assert_eq!(outcome.failed_ids, vec!["nope".to_string(), b.to_string()]);
        assert_eq!(outcome.failures.malformed, vec!["nope".to_string()]);
        assert_eq!(outcome.failures.not_found, vec![b.to_string()]);
    }

    #[test]
    fn partial_status_follows_what_was_removed() {
        let id = Uuid::new_v4();
        let all = PartialOutcome::new(vec![id], vec![], vec![]);
        let some = PartialOutcome::new(vec![id], vec!["x".to_string()], vec![]);
        let none = PartialOutcome::new(vec![], vec!["x".to_string()], vec![]);

        assert_eq!(all.status(), StatusCode::OK);
        assert_eq!(some.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(none.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn count_only_strategies_always_report_ok() {
        let atomic = BulkDeleteOutcome::Atomic { deleted_count: 3 };
        let best_effort = BulkDeleteOutcome::BestEffort { deleted_count: 0 };

        assert_eq!(atomic.status(), StatusCode::OK);
        assert_eq!(best_effort.status(), StatusCode::OK);
        assert_eq!(best_effort.deleted_count(), 0);
        assert_eq!(atomic.strategy(), Strategy::Atomic);
    }
}
