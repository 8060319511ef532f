//! Remote content store interface and implementations
//!
//! A "file" in the remote store is versioned: reading yields the current
//! version token (or nothing, if the file does not exist) and writing is
//! conditional on that token. The engine always re-reads the token
//! immediately before writing, so the two calls form one coupled
//! update operation per file.

mod github;

pub use github::GithubContentStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RepositoryId, VersionToken};

/// Versioned remote file storage consumed by the export orchestrator.
///
/// Implementations map transport and HTTP-status failures to errors; the
/// orchestrator treats a failed write as "file not updated" and moves on.
#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    /// Whether credentials and repository are configured well enough to
    /// attempt a run. Checked before any stage starts.
    fn is_ready(&self) -> bool;

    /// Resolve the export repository, creating it if it does not exist
    async fn ensure_repository(&self) -> Result<RepositoryId>;

    /// Read the current version token of a file; `None` means the file
    /// does not exist and a write will create it
    async fn read_version(&self, path: &str) -> Result<Option<VersionToken>>;

    /// Write file content conditioned on `version`.
    ///
    /// `None` creates the file; `Some` replaces the exact version read.
    /// Returns the new content's version token.
    async fn write_file(
        &self,
        path: &str,
        content: &str,
        version: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken>;

    /// Create-or-update a file: read the current version, then write
    /// conditioned on it. The two calls are sequential and coupled; a
    /// failure in either aborts this file's update only.
    async fn update_file(&self, path: &str, content: &str, message: &str) -> Result<VersionToken> {
        let version = self.read_version(path).await?;
        self.write_file(path, content, version.as_ref(), message)
            .await
    }
}
