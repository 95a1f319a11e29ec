// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use htrr_api::app::{bulk_routes, with_layers, BulkEngines};
use htrr_api::bulk::EngineOptions;
use htrr_api::config::AppConfig;
use htrr_api::database::{Collection, MemoryStore, RecordStore};

/// The bulk delete routes wired to in-memory stores
pub struct TestApp {
    router: Router,
    pub restaurants: MemoryStore,
    pub users: MemoryStore,
    pub positions: MemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        let restaurants = MemoryStore::new(Collection::Restaurants);
        let users = MemoryStore::new(Collection::Users);
        let positions = MemoryStore::new(Collection::Positions);

        let engines = BulkEngines::new(
            |collection| {
                let store: Arc<dyn RecordStore> = match collection {
                    Collection::Restaurants => Arc::new(restaurants.clone()),
                    Collection::Users => Arc::new(users.clone()),
                    Collection::Positions => Arc::new(positions.clone()),
                };
                store
            },
            options,
        );
        let router = with_layers(bulk_routes(engines), &AppConfig::from_env().api);

        Self {
            router,
            restaurants,
            users,
            positions,
        }
    }

    /// Send a raw body to DELETE `path`
    pub async fn delete_raw(&self, path: &str, body: impl Into<Body>) -> Result<(StatusCode, Value)> {
        send(&self.router, "DELETE", path, body).await
    }

    pub async fn bulk_delete(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.delete_raw(path, body.to_string()).await
    }
}

/// Run one JSON request through `router` and decode the JSON reply
pub async fn send(
    router: &Router,
    method: &str,
    path: &str,
    body: impl Into<Body>,
) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(body.into())
        .context("failed to build request")?;

    let response = router
        .clone()
        .oneshot(request)
        .await
        .context("router failed")?;

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .context("failed to read body")?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).context("response body is not JSON")?
    };
    Ok((status, body))
}
