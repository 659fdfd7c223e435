//! Key-value repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Store one JSON document per key (`clipboard`, `todos`).
//! - Provide typed list load/save helpers for the stores.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key for the capture log.
pub const CLIPBOARD_KEY: &str = "clipboard";
/// Storage key for the task list.
pub const TODOS_KEY: &str = "todos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for key-value persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData { key: String, message: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid persisted data under `{key}`: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable string storage addressed by key.
pub trait KvRepository {
    fn get_value(&self, key: &str) -> RepoResult<Option<String>>;
    fn put_value(&self, key: &str, value: &str) -> RepoResult<()>;
}

impl<R: KvRepository + ?Sized> KvRepository for Box<R> {
    fn get_value(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get_value(key)
    }

    fn put_value(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).put_value(key, value)
    }
}

/// SQLite-backed key-value repository.
///
/// Owns its connection so a store can move into the background actor.
pub struct SqliteKvRepository {
    conn: Connection,
}

impl SqliteKvRepository {
    /// Wraps a connection returned by [`crate::db::open_db`].
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl KvRepository for SqliteKvRepository {
    fn get_value(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_value(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Loads a JSON list stored under `key`; a missing key is an empty list.
pub fn load_list<T: DeserializeOwned>(repo: &impl KvRepository, key: &str) -> RepoResult<Vec<T>> {
    let Some(raw) = repo.get_value(key)? else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&raw).map_err(|err| RepoError::InvalidData {
        key: key.to_string(),
        message: err.to_string(),
    })
}

/// Writes the full list under `key`, replacing the previous document.
pub fn save_list<T: Serialize>(repo: &impl KvRepository, key: &str, items: &[T]) -> RepoResult<()> {
    let raw = serde_json::to_string(items).map_err(|err| RepoError::InvalidData {
        key: key.to_string(),
        message: err.to_string(),
    })?;
    repo.put_value(key, &raw)
}
