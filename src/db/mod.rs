//! Database module
//!
//! Handles SQLite connection, migrations, and the engine's store adapter.

pub mod connection;
pub mod migrations;
pub mod store;

pub use connection::{Database, DbError, DbResult};
pub use store::SqliteStore;
