//! `SQLite`-backed key-value store.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::migrations;
use super::KeyValueStore;
use crate::error::{Error, Result};

/// Key-value store persisted in a `SQLite` database file.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List the keys currently holding a value, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value],
        )?;
        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let affected = self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        debug!(key, affected, "Removed key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    #[test]
    fn test_open_in_memory() {
        let store = create_test_store();
        assert_eq!(store.path(), Path::new(":memory:"));
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut store = create_test_store();
        store.set("userName", "Juan").unwrap();
        assert_eq!(store.get("userName").unwrap().as_deref(), Some("Juan"));
    }

    #[test]
    fn test_get_missing() {
        let store = create_test_store();
        assert_eq!(store.get("userWeights").unwrap(), None);
    }

    #[test]
    fn test_set_replaces_value() {
        let mut store = create_test_store();
        store.set("userWeights", "[]").unwrap();
        store
            .set("userWeights", r#"[{"weight":70,"userName":"","date":"2025-06-20T10:00:00.000Z"}]"#)
            .unwrap();

        let value = store.get("userWeights").unwrap().unwrap();
        assert!(value.contains("\"weight\":70"));
        assert_eq!(store.keys().unwrap(), vec!["userWeights".to_string()]);
    }

    #[test]
    fn test_remove() {
        let mut store = create_test_store();
        store.set("userWeights", "[]").unwrap();
        store.set("userName", "Juan").unwrap();

        store.remove("userWeights").unwrap();

        assert_eq!(store.get("userWeights").unwrap(), None);
        assert_eq!(store.keys().unwrap(), vec!["userName".to_string()]);
    }

    #[test]
    fn test_remove_missing_key() {
        let mut store = create_test_store();
        assert!(store.remove("nothing-here").is_ok());
    }

    #[test]
    fn test_open_creates_parent_dirs_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("weights.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set("userName", "Ana").unwrap();
        }

        assert!(path.exists());
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("userName").unwrap().as_deref(), Some("Ana"));
        assert_eq!(store.path(), path.as_path());
    }
}
