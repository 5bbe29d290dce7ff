//! Locked read-modify-write of the project manifest.
//!
//! Every update re-reads `sfdx-project.json` from disk, applies one change,
//! and writes it back atomically while holding an exclusive lock on
//! `.sfdx/dxpm.lock` next to the manifest. Two dxpm processes working on the
//! same project therefore never lose each other's entries.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::SfdxProject;
use crate::core::DxpmError;
use crate::utils::ensure_dir;

const LOCK_DIR: &str = ".sfdx";
const LOCK_FILE: &str = "dxpm.lock";

/// Applies dependency changes to one manifest file.
#[derive(Debug, Clone)]
pub struct ManifestSync {
    path: PathBuf,
}

impl ManifestSync {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Path of the manifest being synchronized.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `package` as installed at `version_id`.
    pub async fn upsert(&self, package: &str, version_id: &str) -> Result<()> {
        self.update(|project| {
            let added = project.upsert_dependency(package, version_id)?;
            tracing::debug!(
                target: "dxpm::manifest",
                "{} dependency {package} -> {version_id}",
                if added { "added" } else { "updated" }
            );
            Ok(true)
        })
        .await
    }

    /// Remove `package` from the manifest; absent packages are ignored.
    pub async fn remove(&self, package: &str) -> Result<()> {
        self.update(|project| {
            let removed = project.remove_dependency(package)?;
            if removed {
                tracing::debug!(target: "dxpm::manifest", "removed dependency {package}");
            } else {
                tracing::debug!(target: "dxpm::manifest", "{package} not in manifest, nothing to remove");
            }
            Ok(removed)
        })
        .await
    }

    /// Apply `change` under the lock; the file is rewritten only if it
    /// reports a modification.
    async fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut SfdxProject) -> Result<bool>,
    {
        let _lock = self.acquire_lock().await?;

        let mut project = SfdxProject::load(&self.path)?;
        let changed = change(&mut project).map_err(|e| DxpmError::manifest_io(&self.path, e))?;
        if changed {
            project.save(&self.path)?;
        }
        Ok(())
    }

    async fn acquire_lock(&self) -> Result<File> {
        use fs4::fs_std::FileExt;

        let root = self.path.parent().unwrap_or_else(|| Path::new("."));
        let lock_dir = root.join(LOCK_DIR);
        ensure_dir(&lock_dir).map_err(|e| DxpmError::manifest_io(&lock_dir, e))?;

        let lock_path = lock_dir.join(LOCK_FILE);
        let lock_file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .await
            .map_err(|e| DxpmError::manifest_io(&lock_path, e))?;
        let std_file = lock_file.into_std().await;

        tracing::debug!(target: "dxpm::manifest", "acquiring lock {}", lock_path.display());
        std_file.lock_exclusive().map_err(|e| DxpmError::manifest_io(&lock_path, e))?;
        Ok(std_file)
    }
}
