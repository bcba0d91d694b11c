//! Deployment checkout cleanup, used by the reset operation.

use crate::error::{Result, StackError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

/// Filesystem side of reset: removing or scrubbing the deployment checkout.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Delete the checkout entirely.
    async fn remove_checkout(&self) -> Result<()>;

    /// Delete generated artifacts (env files, logs, caches) and revert the
    /// checkout to a clean version-control state. Best-effort.
    async fn scrub_artifacts(&self) -> Result<()>;
}

/// A git-managed deployment checkout on the local filesystem.
pub struct GitCheckout {
    root: PathBuf,
}

impl GitCheckout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn git(&self, args: &[&str]) {
        let result = Command::new("git").args(args).current_dir(&self.root).output().await;
        match result {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                warn!(args = ?args, error = %stderr, "git command failed during scrub");
            }
            Err(e) => warn!(args = ?args, error = %e, "failed to invoke git during scrub"),
        }
    }

    /// Remove generated files within one directory: env files, log files,
    /// cache directories.
    fn scrub_dir(dir: &Path) {
        let Ok(entries) = std::fs::read_dir(dir) else { return };
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if path.is_file() {
                let is_env = name == ".env" || name.starts_with(".env.");
                let is_log = path.extension().is_some_and(|e| e == "log");
                if (is_env || is_log) && std::fs::remove_file(&path).is_ok() {
                    info!(path = %path.display(), "Removed generated artifact");
                }
            } else if path.is_dir() && (name == "logs" || name == ".cache") {
                if std::fs::remove_dir_all(&path).is_ok() {
                    info!(path = %path.display(), "Removed generated directory");
                }
            }
        }
    }
}

#[async_trait]
impl Workspace for GitCheckout {
    async fn remove_checkout(&self) -> Result<()> {
        if !self.root.exists() {
            return Ok(());
        }
        info!(path = %self.root.display(), "Removing deployment checkout");
        tokio::fs::remove_dir_all(&self.root)
            .await
            .map_err(|e| StackError::Io { path: self.root.clone(), source: e })
    }

    async fn scrub_artifacts(&self) -> Result<()> {
        if !self.root.exists() {
            return Ok(());
        }
        info!(path = %self.root.display(), "Scrubbing generated artifacts");

        // Top level plus one level of service directories.
        Self::scrub_dir(&self.root);
        if let Ok(entries) = std::fs::read_dir(&self.root) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() && entry.file_name() != ".git" {
                    Self::scrub_dir(&path);
                }
            }
        }

        // Revert tracked files and drop untracked leftovers.
        if self.root.join(".git").exists() {
            self.git(&["checkout", "--", "."]).await;
            self.git(&["clean", "-fd"]).await;
        }

        Ok(())
    }
}
