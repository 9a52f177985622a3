pub mod connection_pool;
mod queries;
pub mod rows;
pub mod sqlite_local_store;

pub use connection_pool::ConnectionPool;
pub use rows::EntityRecordRow;
pub use sqlite_local_store::SqliteLocalStore;
