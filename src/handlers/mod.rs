// handlers/mod.rs - one module per resource, plus the bulk delete entry point
// shared by every collection.
pub mod bulk;
pub mod health;
pub mod positions;
pub mod restaurants;
pub mod users;
pub mod utils;
