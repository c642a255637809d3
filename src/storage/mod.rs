//! SQLite-backed persistence for requests and pages

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStore;
pub use traits::{PageStats, RequestStore, StorageError, StorageResult};
