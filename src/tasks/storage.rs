use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use rusqlite::{named_params, params, Connection, OptionalExtension};
use thiserror::Error;

pub const TASKS_KEY: &str = "tasks";
pub const SESSION_LENGTH_KEY: &str = "sessionLength";
pub const BREAK_LENGTH_KEY: &str = "breakLength";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Could not encode value: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-keyed, string-valued store backed by a single sqlite table.
#[derive(Debug)]
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        let storage = Self { conn };
        storage.ensure_tables()?;
        Ok(storage)
    }

    fn ensure_tables(&self) -> rusqlite::Result<()> {
        self.conn.execute(
            "
        create table if not exists kv (
            key text primary key,
            value text not null,
            updated_at datetime not null
        )
    ",
            (),
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "select value from kv where key = :key",
                named_params! {":key": key},
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "insert into kv (key, value, updated_at) values (?1, ?2, ?3)
             on conflict(key) do update set value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().naive_utc()],
        )?;
        tracing::trace!(key, "persisted");
        Ok(())
    }

    pub fn last_updated(&self, key: &str) -> Result<Option<NaiveDateTime>, StorageError> {
        let at = self
            .conn
            .query_row(
                "select updated_at from kv where key = :key",
                named_params! {":key": key},
                |row| row.get(0),
            )
            .optional()?;
        Ok(at)
    }
}
