// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use conclave_core::ConclaveError;

/// Handle to the single SQLite connection.
///
/// Opening runs PRAGMAs and embedded migrations; query modules accept
/// `&Database` and go through [`Database::connection`].
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if necessary) the database at `path`, applies PRAGMAs,
    /// and runs pending migrations.
    pub async fn open(path: &str) -> Result<Self, ConclaveError> {
        Self::open_with_options(path, true).await
    }

    /// Opens the database, optionally enabling WAL journaling.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, ConclaveError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConclaveError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ConclaveError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| {
            let pragma_err = |e: rusqlite::Error| ConclaveError::Storage {
                source: Box::new(e),
            };
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(pragma_err)?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")
                .map_err(pragma_err)?;
            conn.pragma_update(None, "foreign_keys", "ON")
                .map_err(pragma_err)?;
            conn.pragma_update(None, "busy_timeout", 5000)
                .map_err(pragma_err)?;
            crate::migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(map_tr_app_err)?;

        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL and leaves the connection ready to drop.
    pub async fn close(&self) -> Result<(), ConclaveError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Maps a tokio-rusqlite error into the shared storage error variant.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> ConclaveError {
    ConclaveError::Storage {
        source: Box::new(e),
    }
}

/// Maps a tokio-rusqlite error wrapping a [`ConclaveError`] application error
/// into the shared storage error variant.
fn map_tr_app_err(e: tokio_rusqlite::Error<ConclaveError>) -> ConclaveError {
    match e {
        tokio_rusqlite::Error::Error(inner) => inner,
        other => ConclaveError::Storage {
            source: Box::new(other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok::<Vec<String>, rusqlite::Error>(names)
            })
            .await
            .unwrap();

        assert!(db_path.exists());
        for expected in ["sessions", "messages", "memories", "persona_configurations"] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}");
        }
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/data/conclave.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_is_idempotent_across_restarts() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");

        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
        drop(db);

        // Second open must not re-run applied migrations.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
