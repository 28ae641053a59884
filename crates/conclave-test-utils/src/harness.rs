// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared setup helpers for integration tests.

use std::sync::Arc;

use conclave_config::model::StorageConfig;
use conclave_core::StorageAdapter;
use conclave_storage::SqliteStorage;

/// Opens an initialized SQLite storage backed by a temp directory.
///
/// The returned `TempDir` must be kept alive for the duration of the test.
pub async fn temp_storage() -> (Arc<dyn StorageAdapter>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("conclave-test.db");
    let storage = SqliteStorage::new(StorageConfig {
        database_path: db_path.to_string_lossy().into_owned(),
        wal_mode: true,
    });
    storage.initialize().await.expect("initialize storage");
    (Arc::new(storage), dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn temp_storage_is_usable() {
        let (storage, _dir) = temp_storage().await;
        let sessions = storage.list_sessions(None).await.unwrap();
        assert!(sessions.is_empty());
        storage.close().await.unwrap();
    }
}
