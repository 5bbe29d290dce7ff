//! Install and uninstall orchestration.
//!
//! [`Installer`] ties the pieces together for one command: it checks the
//! preconditions, resolves user-supplied aliases through the
//! [`IdentityResolver`], walks the dependency graph with the
//! [`DependencyWalker`], runs install or uninstall actions through the
//! [`Gateway`], and records every outcome in the project manifest.
//!
//! # Install
//!
//! Installing a package version is a depth-first walk:
//!
//! 1. Push the version onto the install path (a repeat is a cycle)
//! 2. Describe the version and install each direct dependency, in declared
//!    order, before going further
//! 3. Skip the install action if the org already has the version; otherwise
//!    run it and drop the org's cached installed list
//! 4. Upsert the manifest entry
//!
//! Given `P -> [D1, D2]` and `D1 -> [D3]`, actions run in the order
//! `D3, D1, D2, P`, and each dependency is recorded before its parent is
//! touched. A failure stops the walk where it is: whatever was installed and
//! recorded before stays that way, so re-running the same command continues
//! from there.
//!
//! # Uninstall
//!
//! The package name is looked up first, so a version that cannot be named
//! fails before the org is touched. The uninstall action then always runs,
//! whether or not the org reports the version as installed, and is never
//! recursive. Afterwards the package is removed from the manifest; removing an
//! entry that is not there is a no-op.

mod context;


use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use futures::future::{FutureExt, LocalBoxFuture};

use crate::manifest::{ManifestSync, SfdxProject, find_project};
use crate::resolver::{DependencyWalker, IdentityResolver};
use crate::sfdx::Gateway;

pub use context::{DEFAULT_WAIT_MINUTES, InstallOptions};

/// What an install run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Version ids an install action ran for, in order
    pub installed: Vec<String>,
    /// Version ids that were already present in the org
    pub already_installed: Vec<String>,
}

impl InstallReport {
    fn merge(&mut self, other: Self) {
        self.installed.extend(other.installed);
        self.already_installed.extend(other.already_installed);
    }
}

/// Orchestrates installs and uninstalls for one project.
pub struct Installer<'g, G: Gateway> {
    gateway: &'g G,
    manifest: ManifestSync,
    resolver: IdentityResolver,
    walker: DependencyWalker,
    options: InstallOptions,
}

impl<'g, G: Gateway> Installer<'g, G> {
    /// Check that the tool is installed and find the project from `start`.
    ///
    /// Fails with `ToolNotFound` or `ProjectNotFound` before anything else
    /// happens.
    pub fn prepare(gateway: &'g G, start: &Path, options: InstallOptions) -> Result<Self> {
        gateway.ensure_available()?;
        let project_file = find_project(start)?;
        Ok(Self::new(gateway, project_file, options))
    }

    /// Installer for a known manifest path, without precondition checks.
    pub fn new(gateway: &'g G, project_file: PathBuf, options: InstallOptions) -> Self {
        Self {
            gateway,
            manifest: ManifestSync::new(project_file),
            resolver: IdentityResolver::new(options.ordering, options.cache_ttl),
            walker: DependencyWalker::new(options.cache_ttl),
            options,
        }
    }

    /// Path of the manifest this installer records into.
    pub fn project_file(&self) -> &Path {
        self.manifest.path()
    }

    /// Drop every cached listing and piece of version metadata.
    pub fn reset_caches(&mut self) {
        self.resolver.reset();
        self.walker.reset();
    }

    fn progress(&self, line: impl std::fmt::Display) {
        if !self.options.quiet {
            println!("{line}");
        }
    }

    /// Install a package and its dependencies into an org.
    pub async fn install(&mut self, org_alias: &str, package_alias: &str) -> Result<InstallReport> {
        let org = self.resolver.resolve_org(self.gateway, org_alias).await?;
        let version_id = self.resolver.resolve_package_version(self.gateway, package_alias).await?;
        tracing::info!(target: "dxpm::installer", "installing {package_alias} ({version_id}) into {org}");

        let mut report = InstallReport::default();
        self.walker.start_walk();
        self.install_version(&org, &version_id, &mut report).await?;

        self.progress(
            format!(
                "✓ {package_alias}: {} installed, {} already present",
                report.installed.len(),
                report.already_installed.len()
            )
            .green(),
        );
        Ok(report)
    }

    fn install_version<'a>(
        &'a mut self,
        org: &'a str,
        version_id: &'a str,
        report: &'a mut InstallReport,
    ) -> LocalBoxFuture<'a, Result<()>> {
        async move {
            self.walker.enter(version_id)?;
            let result = self.install_entered(org, version_id, report).await;
            self.walker.leave(version_id);
            result
        }
        .boxed_local()
    }

    async fn install_entered(
        &mut self,
        org: &str,
        version_id: &str,
        report: &mut InstallReport,
    ) -> Result<()> {
        let version = self.walker.describe(self.gateway, org, version_id).await?;
        let dependencies: Vec<String> = version.dependency_ids().map(str::to_string).collect();
        tracing::debug!(
            target: "dxpm::installer",
            "{} ({version_id}) has {} direct dependencies",
            version.name,
            dependencies.len()
        );

        for dependency in &dependencies {
            self.install_version(org, dependency, report).await?;
        }

        if self.walker.is_installed(self.gateway, org, version_id).await? {
            tracing::info!(
                target: "dxpm::installer",
                "{} ({version_id}) already installed in {org}, skipping",
                version.name
            );
            report.already_installed.push(version_id.to_string());
        } else {
            self.progress(format!("Installing {} ({version_id})...", version.name).cyan());
            self.gateway.install_package(org, version_id, self.options.wait_minutes).await?;
            self.walker.invalidate_installed(org);
            tracing::info!(target: "dxpm::installer", "installed {} ({version_id})", version.name);
            report.installed.push(version_id.to_string());
        }

        self.manifest.upsert(&version.name, version_id).await
    }

    /// Install every dependency declared by the project, in manifest order.
    ///
    /// Each entry is resolved through `packageAliases`, falling back to the
    /// package name when the table has no entry for it.
    pub async fn install_project(&mut self, org_alias: &str) -> Result<InstallReport> {
        let project = SfdxProject::load(self.manifest.path())?;
        let targets: Vec<String> = project
            .dependencies()
            .iter()
            .map(|d| project.alias(&d.package).unwrap_or(d.package.as_str()).to_string())
            .collect();

        if targets.is_empty() {
            tracing::warn!(target: "dxpm::installer", "project declares no dependencies");
            self.progress("No dependencies to install");
        }

        let mut report = InstallReport::default();
        for target in &targets {
            report.merge(self.install(org_alias, target).await?);
        }
        Ok(report)
    }

    /// Uninstall a package version from an org and drop it from the manifest.
    ///
    /// The package name is settled before the uninstall action runs, so a
    /// failed lookup never leaves the org and the manifest out of step.
    /// Returns the package name that was removed from the manifest.
    pub async fn uninstall(&mut self, org_alias: &str, package_alias: &str) -> Result<String> {
        let org = self.resolver.resolve_org(self.gateway, org_alias).await?;
        let version_id = self.resolver.resolve_package_version(self.gateway, package_alias).await?;
        let name = self.package_name(&org, &version_id).await?;

        tracing::info!(target: "dxpm::installer", "uninstalling {name} ({version_id}) from {org}");
        self.progress(format!("Uninstalling {name} ({version_id})...").cyan());
        self.gateway.uninstall_package(&org, &version_id).await?;
        self.walker.invalidate_installed(&org);

        self.manifest.remove(&name).await?;
        self.progress(format!("✓ Uninstalled {name}").green());
        Ok(name)
    }

    /// Package name of a version: walker cache, then the dev hub's version
    /// list, then a metadata query against the org.
    async fn package_name(&mut self, org: &str, version_id: &str) -> Result<String> {
        if let Some(name) = self.walker.cached_name(version_id) {
            return Ok(name.to_string());
        }

        match self.resolver.package_version(self.gateway, version_id).await {
            Ok(Some(version)) => return Ok(version.package_name),
            Ok(None) => {
                tracing::debug!(
                    target: "dxpm::installer",
                    "{version_id} not in the version list, describing it"
                );
            }
            Err(e) => {
                tracing::warn!(
                    target: "dxpm::installer",
                    "version list unavailable ({e}), describing {version_id} instead"
                );
            }
        }

        Ok(self.walker.describe(self.gateway, org, version_id).await?.name)
    }

    /// Create a scratch org from a definition file and make its alias resolvable.
    pub async fn create_scratch_org(&mut self, definition_file: &Path, alias: &str) -> Result<()> {
        tracing::info!(
            target: "dxpm::installer",
            "creating scratch org {alias} from {}",
            definition_file.display()
        );
        self.progress(format!("Creating scratch org {alias}...").cyan());
        self.gateway.create_scratch_org(definition_file, alias).await?;
        self.resolver.reset_orgs();
        Ok(())
    }
}
