use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::bulk::{BulkDeleteEngine, BulkDeleteOutcome, BulkDeletePayload, DeletionRequest};
use crate::error::ApiError;

use super::utils::json_body;

/// DELETE /{collection}/bulk - delete many records under the requested strategy
///
/// Body: `{"ids": [...], "strategy": "atomic" | "partial" | "best_effort"}`.
/// Request-level problems are rejected here, before the engine touches the store.
pub async fn delete(
    State(engine): State<BulkDeleteEngine>,
    payload: Result<Json<BulkDeletePayload>, JsonRejection>,
) -> Result<BulkDeleteOutcome, ApiError> {
    let payload = json_body(payload)?;
    let request = DeletionRequest::try_from(payload)?;
    Ok(engine.execute(request).await?)
}
