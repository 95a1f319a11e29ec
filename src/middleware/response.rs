use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Flat `{key: value}` JSON envelope shared by every handler
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    body: Result<Map<String, Value>, String>,
}

impl ApiResponse {
    /// Create an API response with custom status code
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            body: Ok(Map::new()),
        }
    }

    /// Create a 200 OK response
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// Create a 201 Created response
    pub fn created() -> Self {
        Self::with_status(StatusCode::CREATED)
    }

    /// Add one key to the envelope
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                self.body = Err(e.to_string());
                return self;
            }
        };
        if let Ok(body) = &mut self.body {
            body.insert(key.to_string(), value);
        }
        self
    }

    /// Copy every top-level key of a struct into the envelope
    pub fn merge<T: Serialize>(mut self, value: T) -> Self {
        let fields = match serde_json::to_value(value) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                self.body = Err(format!("expected a JSON object, got {}", other));
                return self;
            }
            Err(e) => {
                self.body = Err(e.to_string());
                return self;
            }
        };
        if let Ok(body) = &mut self.body {
            body.extend(fields);
        }
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        match self.body {
            Ok(body) => (self.status, Json(Value::Object(body))).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": true,
                        "message": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
