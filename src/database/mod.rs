pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
mod queries;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgRecordStore;
pub use repository::Repository;
pub use store::{Collection, RecordStore, StoreScope};
