//! SQL schema for the Shaya SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

use rusqlite::{Connection, functions::FunctionFlags};

/// SQL function lowercasing its argument with full Unicode case mapping.
/// SQLite's own `lower()` and `LIKE` fold ASCII letters only.
pub const FOLD_FN: &str = "unicode_lower";

/// Register the connection-local SQL functions the store's queries use.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD_FN,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
  )
}

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name   TEXT NOT NULL,
    document    TEXT NOT NULL UNIQUE,
    phone       TEXT,
    email       TEXT NOT NULL UNIQUE,
    observation TEXT,
    created_at  TEXT NOT NULL         -- RFC 3339 UTC; server-assigned
);

-- Role tables each own exactly one person. The foreign key is checked at
-- commit so a delete may remove the person before the owning row.
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,
    hashed_password TEXT NOT NULL,
    role            TEXT NOT NULL CHECK (role IN ('admin', 'user')),
    person_id       INTEGER NOT NULL UNIQUE
                    REFERENCES persons(id) DEFERRABLE INITIALLY DEFERRED
);

CREATE TABLE IF NOT EXISTS customers (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_type TEXT NOT NULL,
    address       TEXT NOT NULL,
    city          TEXT NOT NULL,
    person_id     INTEGER NOT NULL UNIQUE
                  REFERENCES persons(id) DEFERRABLE INITIALLY DEFERRED
);

CREATE TABLE IF NOT EXISTS farmers (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    farm_name     TEXT NOT NULL UNIQUE,
    farm_location TEXT NOT NULL UNIQUE,
    person_id     INTEGER NOT NULL UNIQUE
                  REFERENCES persons(id) DEFERRABLE INITIALLY DEFERRED
);

CREATE INDEX IF NOT EXISTS persons_full_name_idx ON persons(full_name);

PRAGMA user_version = 1;
";
