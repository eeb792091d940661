//! Database module: the local metadata cache.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL applied when the database file is first created
//! - `sqlite.rs`: connection setup and cache queries

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::CachedFileRecord;
pub use schema::SQLITE_INIT;
pub use sqlite::{FileCache, SqlitePool};
