//! Common test utilities and fixtures for dxpm integration tests
//!
//! ```rust,ignore
//! let project = TestProject::new()?;
//! project.write_manifest(&ProjectBuilder::new().package_directory("force-app", None).build())?;
//!
//! let gateway = standard_gateway();
//! let mut installer = project.installer(&gateway);
//! installer.install("dev", "Parent").await?;
//!
//! let manifest = project.read_manifest()?;
//! ```

#![allow(dead_code)]

mod project_builder;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use dxpm_cli::installer::{InstallOptions, Installer};
use dxpm_cli::manifest::{PROJECT_FILE_NAME, SfdxProject};
use dxpm_cli::sfdx::Gateway;
use dxpm_cli::test_utils::FakeGateway;

pub use project_builder::ProjectBuilder;

/// Username of the scratch org every standard fixture installs into.
pub const DEV_ORG: &str = "dev@example.com";

/// A temporary Salesforce DX project.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
}

impl TestProject {
    /// Create an empty project directory with a one-directory manifest.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        std::fs::create_dir_all(project_dir.join("force-app"))?;

        let project = Self {
            _temp_dir: temp_dir,
            project_dir,
        };
        project.write_manifest(&ProjectBuilder::new().package_directory("force-app", None).build())?;
        Ok(project)
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir.join(PROJECT_FILE_NAME)
    }

    pub fn write_manifest(&self, content: &str) -> Result<()> {
        std::fs::write(self.manifest_path(), content)?;
        Ok(())
    }

    pub fn read_manifest(&self) -> Result<SfdxProject> {
        SfdxProject::load(&self.manifest_path())
    }

    pub fn manifest_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&std::fs::read_to_string(self.manifest_path())?)?)
    }

    /// Installer rooted in a nested source directory, found by walking up.
    pub fn installer<'g, G: Gateway>(&self, gateway: &'g G) -> Installer<'g, G> {
        let options = InstallOptions {
            quiet: true,
            ..InstallOptions::default()
        };
        Installer::prepare(gateway, &self.project_dir.join("force-app"), options)
            .unwrap_or_else(|e| panic!("failed to prepare installer: {e:#}"))
    }

    /// Dependency names of the first package directory, in order.
    pub fn dependency_names(&self) -> Result<Vec<String>> {
        Ok(self.read_manifest()?.dependencies().iter().map(|d| d.package.clone()).collect())
    }
}

/// Dev hub, one scratch org and the graph `P -> [D1, D2]`, `D1 -> [D3]`.
pub fn standard_gateway() -> FakeGateway {
    FakeGateway::new()
        .with_org("00D000000000001", "hub@example.com", Some("hub"), true)
        .with_scratch_org("00D000000000002", DEV_ORG, Some("dev"))
        .with_package("Parent", "033P", "0HoP", "04tP", "1.0.0.1", &["04tD1", "04tD2"])
        .with_package("Dep1", "033D1", "0HoD1", "04tD1", "1.0.0.1", &["04tD3"])
        .with_package("Dep2", "033D2", "0HoD2", "04tD2", "1.0.0.1", &[])
        .with_package("Dep3", "033D3", "0HoD3", "04tD3", "1.0.0.1", &[])
}
