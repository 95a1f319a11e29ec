pub mod api;
pub mod app;
pub mod bulk;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
