//! SQL DDL for a freshly created cache database.

/// SQLite schema with:
/// - `users`: declared for shape compatibility; nothing reads or writes it
/// - `file_cache`: one row per Drive file id, replaced on every listing
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT UNIQUE NOT NULL,
    last_login TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS file_cache (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    mime_type TEXT,
    size INTEGER,
    last_modified TEXT
);
"#;
