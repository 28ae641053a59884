// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory workspace sink for file-directive assertions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use conclave_core::{ConclaveError, WorkspaceSink};

/// A `WorkspaceSink` that collects writes into a map; optionally fails every
/// write to exercise the absorb-and-continue path.
pub struct MemoryWorkspace {
    files: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: bool,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            fail_writes: false,
        }
    }

    /// A workspace whose writes always fail.
    pub fn failing() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            fail_writes: true,
        }
    }

    /// Content of a written file, if any.
    pub async fn file(&self, path: &str) -> Option<String> {
        self.files.lock().await.get(path).cloned()
    }

    /// Number of files written.
    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }
}

impl Default for MemoryWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkspaceSink for MemoryWorkspace {
    async fn write(
        &self,
        relative_path: &str,
        content: &str,
        _cancel: CancellationToken,
    ) -> Result<(), ConclaveError> {
        if self.fail_writes {
            return Err(ConclaveError::Workspace {
                message: format!("write to {relative_path} failed (configured)"),
            });
        }
        self.files
            .lock()
            .await
            .insert(relative_path.to_string(), content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_writes() {
        let workspace = MemoryWorkspace::new();
        workspace
            .write("src/main.rs", "fn main() {}", CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(workspace.file_count().await, 1);
        assert_eq!(
            workspace.file("src/main.rs").await.as_deref(),
            Some("fn main() {}")
        );
    }

    #[tokio::test]
    async fn failing_workspace_rejects_writes() {
        let workspace = MemoryWorkspace::failing();
        let err = workspace
            .write("x", "y", CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConclaveError::Workspace { .. }));
        assert_eq!(workspace.file_count().await, 0);
    }
}
