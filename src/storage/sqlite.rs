use super::{KeyValueBackend, StorageError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-based key-value storage
pub struct SqliteBackend {
    conn: Connection,
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend").finish_non_exhaustive()
    }
}

impl SqliteBackend {
    /// Create or open the database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            ",
        )?;

        let backend = Self { conn };
        log::info!("Preference store opened at {:?} ({} keys)", db_path, backend.count()?);

        Ok(backend)
    }

    /// Number of stored keys
    pub fn count(&self) -> Result<i64, StorageError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?)
    }
}

impl KeyValueBackend for SqliteBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        log::debug!("Stored '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_and_read() {
        let dir = tempdir().unwrap();
        let db = SqliteBackend::open(&dir.path().join("kv.db")).unwrap();

        assert_eq!(db.read("wallpaper").unwrap(), None);
        db.write("wallpaper", "\"https://example.com/a.jpg\"").unwrap();
        assert_eq!(
            db.read("wallpaper").unwrap().as_deref(),
            Some("\"https://example.com/a.jpg\"")
        );
    }

    #[test]
    fn test_overwrite_keeps_single_row() {
        let dir = tempdir().unwrap();
        let db = SqliteBackend::open(&dir.path().join("kv.db")).unwrap();

        db.write("backgroundBlur", "12").unwrap();
        db.write("backgroundBlur", "20").unwrap();

        assert_eq!(db.count().unwrap(), 1);
        assert_eq!(db.read("backgroundBlur").unwrap().as_deref(), Some("20"));
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let db = SqliteBackend::open(&dir.path().join("kv.db")).unwrap();

        db.write("userCity", "\"Rome\"").unwrap();
        db.remove("userCity").unwrap();
        db.remove("userCity").unwrap();

        assert_eq!(db.read("userCity").unwrap(), None);
        assert_eq!(db.count().unwrap(), 0);
    }
}
