//! Durable commit of the snapshot file.
//!
//! The pipeline only needs "durably record the current snapshot"; what that
//! means is behind [`PersistenceSink`]. The default implementation stages the
//! file in a git repository, commits it with a timestamped message, and pushes
//! to the configured remote.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::debug;

use crate::error::{AisError, AisResult};

/// Durable-storage collaborator invoked after each snapshot write.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Durably commit the snapshot at `snapshot`.
    ///
    /// # Errors
    /// Returns an error if the commit could not be completed; the caller logs
    /// and carries on, so implementations must not leave partial state that
    /// would break the next attempt.
    async fn commit(&self, snapshot: &Path) -> AisResult<()>;
}

/// Git-backed sink: `git add`, `git commit`, `git push`.
#[derive(Debug, Clone)]
pub struct GitSink {
    repo_dir: PathBuf,
}

impl GitSink {
    /// Create a sink operating on the repository at `repo_dir`.
    #[must_use]
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    async fn git(&self, args: &[&str]) -> AisResult<()> {
        debug!(repo = %self.repo_dir.display(), ?args, "Running git");
        let status = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(AisError::Persistence(format!(
                "`git {}` exited with {status}",
                args.join(" ")
            )))
        }
    }
}

#[async_trait]
impl PersistenceSink for GitSink {
    async fn commit(&self, snapshot: &Path) -> AisResult<()> {
        let file = snapshot.to_string_lossy();
        let message = format!("Update {}", Utc::now().to_rfc3339());

        self.git(&["add", file.as_ref()]).await?;
        self.git(&["commit", "-m", &message]).await?;
        self.git(&["push"]).await
    }
}

/// Sink that acknowledges every commit without storing anything.
///
/// Useful for dry runs and tests where no git remote exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl PersistenceSink for NullSink {
    async fn commit(&self, _snapshot: &Path) -> AisResult<()> {
        Ok(())
    }
}
