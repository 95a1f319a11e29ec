use axum::{extract::rejection::JsonRejection, Json};
use uuid::Uuid;

use crate::bulk::identifier;
use crate::error::ApiError;

/// Parse a record id from the path; only canonical UUID text is accepted
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    identifier::parse(raw).ok_or_else(|| ApiError::field_error("id", "invalid id format"))
}

/// Unwrap a JSON body, turning decode failures into a 400 with the decoder's message
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = payload?;
    Ok(body)
}

/// Reject blank required text fields
pub fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::field_error(field, format!("{} is required", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn parse_id_rejects_non_canonical_ids() {
        assert!(parse_id("11111111-1111-1111-1111-111111111111").is_ok());
        let err = parse_id("42").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn require_flags_blank_values() {
        assert!(require("name", "Pho 24").is_ok());
        let err = require("name", "   ").unwrap_err();
        assert_eq!(err.message(), "name is required");
    }
}
