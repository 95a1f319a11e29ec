use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::bulk::{BulkDeleteEngine, EngineOptions};
use crate::config::{ApiConfig, AppConfig};
use crate::database::{Collection, PgRecordStore, RecordStore};
use crate::handlers::{bulk, health, positions, restaurants, users};

/// One bulk delete engine per collection
#[derive(Clone)]
pub struct BulkEngines {
    pub restaurants: BulkDeleteEngine,
    pub users: BulkDeleteEngine,
    pub positions: BulkDeleteEngine,
}

impl BulkEngines {
    pub fn new<F>(store_for: F, options: EngineOptions) -> Self
    where
        F: Fn(Collection) -> Arc<dyn RecordStore>,
    {
        Self {
            restaurants: BulkDeleteEngine::new(store_for(Collection::Restaurants), options),
            users: BulkDeleteEngine::new(store_for(Collection::Users), options),
            positions: BulkDeleteEngine::new(store_for(Collection::Positions), options),
        }
    }

    pub fn postgres(pool: &PgPool, options: EngineOptions) -> Self {
        Self::new(
            |collection| Arc::new(PgRecordStore::new(pool.clone(), collection)),
            options,
        )
    }
}

/// The full service: resource routes, bulk delete routes and global middleware
pub fn app(pool: PgPool, config: &AppConfig) -> Router {
    let engines = BulkEngines::postgres(&pool, EngineOptions::from(&config.bulk));

    let router = Router::new()
        .merge(resource_routes(pool))
        .merge(bulk_routes(engines));

    with_layers(router, &config.api)
}

pub fn resource_routes(pool: PgPool) -> Router {
    Router::new()
        .route("/health", get(health::get))
        // Restaurants
        .route(
            "/restaurants",
            get(restaurants::search).post(restaurants::create),
        )
        .route(
            "/restaurants/:id",
            get(restaurants::get)
                .patch(restaurants::update)
                .delete(restaurants::delete),
        )
        // Users
        .route("/users", post(users::create))
        .route("/users/:id", get(users::get))
        // Positions
        .route("/positions", post(positions::create))
        .route("/positions/:id", get(positions::get).put(positions::update))
        .with_state(pool)
}

pub fn bulk_routes(engines: BulkEngines) -> Router {
    Router::new()
        .route(
            "/restaurants/bulk",
            delete(bulk::delete).with_state(engines.restaurants),
        )
        .route("/users/bulk", delete(bulk::delete).with_state(engines.users))
        .route(
            "/positions/bulk",
            delete(bulk::delete).with_state(engines.positions),
        )
}

pub fn with_layers(router: Router, api: &ApiConfig) -> Router {
    let mut router = router.layer(DefaultBodyLimit::max(api.max_request_size_bytes));
    if api.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}
