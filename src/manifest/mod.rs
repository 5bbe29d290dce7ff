//! The Salesforce DX project manifest (`sfdx-project.json`).
//!
//! dxpm records the packages a project depends on in two places of the
//! manifest: the `dependencies` list of the first package directory and the
//! top-level `packageAliases` table, which maps each package name to the
//! version id that was installed.
//!
//! ```json
//! {
//!   "packageDirectories": [
//!     {
//!       "path": "force-app",
//!       "default": true,
//!       "package": "MyApp",
//!       "versionName": "ver 1.0",
//!       "versionNumber": "1.0.0.NEXT",
//!       "dependencies": [{ "package": "Logger" }]
//!     }
//!   ],
//!   "namespace": "",
//!   "sfdcLoginUrl": "https://login.salesforce.com",
//!   "sourceApiVersion": "48.0",
//!   "packageAliases": { "Logger": "04t..." }
//! }
//! ```
//!
//! Only those two places are ever modified. Every other field, including ones
//! dxpm does not model, is written back as it was read.
//!
//! [`find_project`] locates the manifest by walking up from a directory,
//! [`SfdxProject`] holds the parsed document, and [`ManifestSync`] performs the
//! locked read-modify-write cycles used after install and uninstall.

pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::DxpmError;
use crate::utils::atomic_write;

pub use sync::ManifestSync;

/// File name that marks a Salesforce DX project root.
pub const PROJECT_FILE_NAME: &str = "sfdx-project.json";

/// Find `sfdx-project.json` in `start` or the nearest ancestor.
pub fn find_project(start: &Path) -> Result<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(PROJECT_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(target: "dxpm::manifest", "found project file {}", candidate.display());
            return Ok(candidate);
        }
        current = dir.parent();
    }
    Err(DxpmError::ProjectNotFound {
        start: start.to_path_buf(),
    }
    .into())
}

/// A dependency entry of a package directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDependency {
    /// Package name; a key of `packageAliases`
    pub package: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectDependency {
    /// Entry with just a package name.
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            extra: Map::new(),
        }
    }
}

/// One entry of `packageDirectories`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDirectory {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<ProjectDependency>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parsed `sfdx-project.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SfdxProject {
    pub package_directories: Vec<PackageDirectory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sfdc_login_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_api_version: Option<String>,
    #[serde(default)]
    pub package_aliases: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SfdxProject {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DxpmError::manifest_io(path, e))?;
        let project = serde_json::from_str(&content)
            .map_err(|e| DxpmError::manifest_io(path, format!("invalid JSON: {e}")))?;
        Ok(project)
    }

    /// Serialize with two-space indentation and replace the file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content =
            serde_json::to_string_pretty(self).map_err(|e| DxpmError::manifest_io(path, e))?;
        content.push('\n');
        atomic_write(path, content.as_bytes()).map_err(|e| DxpmError::manifest_io(path, e))?;
        Ok(())
    }

    fn first_directory_mut(&mut self) -> Option<&mut PackageDirectory> {
        self.package_directories.first_mut()
    }

    /// Dependencies declared by the first package directory.
    pub fn dependencies(&self) -> &[ProjectDependency] {
        self.package_directories
            .first()
            .and_then(|d| d.dependencies.as_deref())
            .unwrap_or_default()
    }

    /// Version id (or other alias target) recorded for a package name.
    pub fn alias(&self, package: &str) -> Option<&str> {
        self.package_aliases.get(package).and_then(Value::as_str)
    }

    /// Record `package` as a dependency pinned to `version_id`.
    ///
    /// The dependency entry is appended only if missing; the alias is always
    /// overwritten. Returns `true` when a new dependency entry was added.
    pub fn upsert_dependency(&mut self, package: &str, version_id: &str) -> Result<bool> {
        let directory = self
            .first_directory_mut()
            .ok_or_else(|| anyhow::anyhow!("manifest has no package directories"))?;
        let dependencies = directory.dependencies.get_or_insert_with(Vec::new);

        let added = if dependencies.iter().any(|d| d.package == package) {
            false
        } else {
            dependencies.push(ProjectDependency::new(package));
            true
        };

        self.package_aliases.insert(package.to_string(), Value::String(version_id.to_string()));
        Ok(added)
    }

    /// Drop `package` from the dependency list and alias table.
    ///
    /// A dependency list emptied by the removal is dropped from the directory.
    /// Returns `true` if anything was removed; an absent package is a no-op.
    pub fn remove_dependency(&mut self, package: &str) -> Result<bool> {
        let directory = self
            .first_directory_mut()
            .ok_or_else(|| anyhow::anyhow!("manifest has no package directories"))?;

        let mut removed = false;
        if let Some(dependencies) = directory.dependencies.as_mut() {
            let before = dependencies.len();
            dependencies.retain(|d| d.package != package);
            removed = dependencies.len() != before;
            if removed && dependencies.is_empty() {
                directory.dependencies = None;
            }
        }

        removed |= self.package_aliases.shift_remove(package).is_some();
        Ok(removed)
    }
}
