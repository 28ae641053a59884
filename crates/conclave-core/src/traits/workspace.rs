// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workspace sink trait for persona file-write directives.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ConclaveError;

/// Receives `FILE` directives emitted by personas.
///
/// Paths are POSIX-style and relative; implementations must reject any path
/// that escapes their configured root and create parent directories on
/// demand. Failures are passed back as errors; the persona engine logs and
/// skips them without interrupting the session.
#[async_trait]
pub trait WorkspaceSink: Send + Sync {
    async fn write(
        &self,
        relative_path: &str,
        content: &str,
        cancel: CancellationToken,
    ) -> Result<(), ConclaveError>;
}
