// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem workspace sink for `[FILE]` directives.
//!
//! Writes are confined to a configured root directory: paths are POSIX-style
//! and relative, leading slashes are stripped, and any path whose normalized
//! form escapes the root is rejected. Parent directories are created on
//! demand.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use conclave_core::{ConclaveError, WorkspaceSink};

/// Workspace sink rooted at a directory on the local filesystem.
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The confinement root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalizes a directive path and rejects anything that would land
    /// outside the root.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, ConclaveError> {
        let trimmed = relative_path.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(ConclaveError::Workspace {
                message: "file path must not be empty".to_string(),
            });
        }

        let mut resolved = PathBuf::new();
        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !resolved.pop() {
                        return Err(ConclaveError::Workspace {
                            message: format!("path `{relative_path}` escapes the workspace root"),
                        });
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(ConclaveError::Workspace {
                        message: format!("path `{relative_path}` is not relative"),
                    });
                }
            }
        }
        if resolved.as_os_str().is_empty() {
            return Err(ConclaveError::Workspace {
                message: format!("path `{relative_path}` resolves to the workspace root"),
            });
        }

        Ok(self.root.join(resolved))
    }
}

#[async_trait]
impl WorkspaceSink for FsWorkspace {
    async fn write(
        &self,
        relative_path: &str,
        content: &str,
        cancel: CancellationToken,
    ) -> Result<(), ConclaveError> {
        if cancel.is_cancelled() {
            return Err(ConclaveError::Cancelled);
        }
        let target = self.resolve(relative_path)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ConclaveError::Workspace {
                    message: format!("failed to create {}: {e}", parent.display()),
                })?;
        }

        tokio::fs::write(&target, content)
            .await
            .map_err(|e| ConclaveError::Workspace {
                message: format!("failed to write {}: {e}", target.display()),
            })?;

        debug!(path = %target.display(), bytes = content.len(), "workspace file written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_file_under_root() {
        let dir = tempdir().unwrap();
        let workspace = FsWorkspace::new(dir.path());

        workspace
            .write("notes/design.md", "# Design", CancellationToken::new())
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("notes/design.md")).unwrap();
        assert_eq!(written, "# Design");
    }

    #[tokio::test]
    async fn leading_slash_is_stripped() {
        let dir = tempdir().unwrap();
        let workspace = FsWorkspace::new(dir.path());

        workspace
            .write("/top.txt", "x", CancellationToken::new())
            .await
            .unwrap();
        assert!(dir.path().join("top.txt").exists());
    }

    #[tokio::test]
    async fn traversal_outside_root_is_rejected() {
        let dir = tempdir().unwrap();
        let workspace = FsWorkspace::new(dir.path());

        let err = workspace
            .write("../escape.txt", "x", CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConclaveError::Workspace { .. }));

        let err = workspace
            .write("a/../../escape.txt", "x", CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConclaveError::Workspace { .. }));
    }

    #[tokio::test]
    async fn internal_dot_dot_within_root_is_normalized() {
        let dir = tempdir().unwrap();
        let workspace = FsWorkspace::new(dir.path());

        workspace
            .write("a/b/../c.txt", "x", CancellationToken::new())
            .await
            .unwrap();
        assert!(dir.path().join("a/c.txt").exists());
    }

    #[tokio::test]
    async fn empty_path_is_rejected() {
        let dir = tempdir().unwrap();
        let workspace = FsWorkspace::new(dir.path());

        let err = workspace
            .write("  ", "x", CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConclaveError::Workspace { .. }));
    }

    #[tokio::test]
    async fn cancelled_token_skips_the_write() {
        let dir = tempdir().unwrap();
        let workspace = FsWorkspace::new(dir.path());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = workspace.write("x.txt", "x", cancel).await.unwrap_err();
        assert!(matches!(err, ConclaveError::Cancelled));
        assert!(!dir.path().join("x.txt").exists());
    }
}
