//! Package dependency discovery.
//!
//! [`DependencyWalker`] supplies what the installer needs to walk a package's
//! dependency graph depth-first: the metadata and direct dependency list of a
//! version, the set of versions already installed in an org, and the stack of
//! versions currently being installed, which is how cycles are caught.
//!
//! Version metadata never changes once published, so it is cached for the
//! whole run. Installed-package listings are cached per org and must be
//! invalidated by the caller after anything is installed into that org.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};

use super::cache::Cached;
use crate::core::DxpmError;
use crate::sfdx::{Gateway, InstalledPackage, SubscriberPackage, SubscriberPackageVersion, query_single};

const VERSION_FIELDS: &str = "Id, SubscriberPackageId, MajorVersion, MinorVersion, PatchVersion, \
                              BuildNumber, Package2ContainerOptions, Dependencies";

/// Metadata, installed-state and install-path tracking for dependency walks.
#[derive(Debug, Default)]
pub struct DependencyWalker {
    versions: HashMap<String, SubscriberPackageVersion>,
    installed: HashMap<String, Cached<Vec<InstalledPackage>>>,
    path: Vec<String>,
    ttl: Option<Duration>,
}

impl DependencyWalker {
    /// Create a walker; `ttl` bounds how long installed-package lists are trusted.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    /// Forget all cached metadata and installed-package lists.
    pub fn reset(&mut self) {
        self.versions.clear();
        self.installed.clear();
        self.path.clear();
    }

    /// Metadata of `version_id` as seen from `org`, including its package name.
    ///
    /// The first lookup queries `SubscriberPackageVersion` and then
    /// `SubscriberPackage` for the name; later lookups are served from cache.
    pub async fn describe<G: Gateway>(
        &mut self,
        gateway: &G,
        org: &str,
        version_id: &str,
    ) -> Result<SubscriberPackageVersion> {
        if let Some(version) = self.versions.get(version_id) {
            return Ok(version.clone());
        }

        tracing::debug!(target: "dxpm::resolver", "describing package version {version_id}");
        let mut version: SubscriberPackageVersion =
            query_single(gateway, org, "SubscriberPackageVersion", version_id, VERSION_FIELDS)
                .await?;
        let package: SubscriberPackage =
            query_single(gateway, org, "SubscriberPackage", &version.package_id, "Name").await?;
        version.name = package.name;

        self.versions.insert(version_id.to_string(), version.clone());
        Ok(version)
    }

    /// Cached package name for a version described earlier in this run.
    pub fn cached_name(&self, version_id: &str) -> Option<&str> {
        self.versions.get(version_id).map(|v| v.name.as_str())
    }

    /// Whether `version_id` is installed in `org`.
    pub async fn is_installed<G: Gateway>(
        &mut self,
        gateway: &G,
        org: &str,
        version_id: &str,
    ) -> Result<bool> {
        let ttl = self.ttl;
        let entry = self.installed.entry(org.to_string()).or_insert_with(|| Cached::new(ttl));
        if !entry.is_loaded() {
            tracing::debug!(target: "dxpm::resolver", "loading installed packages for {org}");
            let list = gateway.list_installed_packages(org).await?;
            entry.set(list);
        }
        let installed = entry.get().context("installed package cache is empty")?;
        Ok(installed.iter().any(|p| p.version_id == version_id))
    }

    /// Drop the installed-package list of `org` so the next check re-queries.
    pub fn invalidate_installed(&mut self, org: &str) {
        if let Some(entry) = self.installed.get_mut(org) {
            entry.reset();
        }
    }

    /// Push `version_id` onto the install path.
    ///
    /// Fails with [`DxpmError::CyclicDependency`] if it is already on the path.
    pub fn enter(&mut self, version_id: &str) -> Result<()> {
        if self.path.iter().any(|v| v == version_id) {
            let mut chain = self.path.clone();
            chain.push(version_id.to_string());
            return Err(DxpmError::CyclicDependency { chain }.into());
        }
        self.path.push(version_id.to_string());
        Ok(())
    }

    /// Pop `version_id` from the install path.
    pub fn leave(&mut self, version_id: &str) {
        if self.path.last().map(String::as_str) == Some(version_id) {
            self.path.pop();
        }
    }

    /// Clear the install path before a new top-level install.
    pub fn start_walk(&mut self) {
        self.path.clear();
    }

    /// Versions currently being installed, outermost first.
    pub fn path(&self) -> &[String] {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeGateway, GatewayCall};

    const ORG: &str = "user@example.com";

    #[tokio::test]
    async fn test_describe_fills_name_and_caches() {
        let gw = FakeGateway::new()
            .with_subscriber_version("04tP", "033P", "Parent", &["04tD1", "04tD2"]);
        let mut walker = DependencyWalker::new(None);

        let version = walker.describe(&gw, ORG, "04tP").await.unwrap();
        assert_eq!(version.name, "Parent");
        assert_eq!(version.dependency_ids().collect::<Vec<_>>(), vec!["04tD1", "04tD2"]);

        walker.describe(&gw, ORG, "04tP").await.unwrap();
        assert_eq!(gw.count_calls(|c| matches!(c, GatewayCall::Query { .. })), 2);
        assert_eq!(walker.cached_name("04tP"), Some("Parent"));
    }

    #[tokio::test]
    async fn test_describe_unknown_version() {
        let gw = FakeGateway::new();
        let mut walker = DependencyWalker::new(None);
        let err = walker.describe(&gw, ORG, "04tMissing").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DxpmError>(),
            Some(DxpmError::ResolutionFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_describe_duplicate_records() {
        let gw = FakeGateway::new()
            .with_subscriber_version("04tP", "033P", "Parent", &[])
            .with_duplicate_record("04tP");
        let mut walker = DependencyWalker::new(None);
        let err = walker.describe(&gw, ORG, "04tP").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<DxpmError>(),
            Some(&DxpmError::MultipleRecordsFailure {
                entity: "SubscriberPackageVersion".into(),
                id: "04tP".into(),
                count: 2,
            })
        );
    }

    #[tokio::test]
    async fn test_installed_cache_per_org_and_invalidation() {
        let gw = FakeGateway::new().with_installed(ORG, "04tA");
        let mut walker = DependencyWalker::new(None);

        assert!(walker.is_installed(&gw, ORG, "04tA").await.unwrap());
        assert!(!walker.is_installed(&gw, ORG, "04tB").await.unwrap());
        assert!(!walker.is_installed(&gw, "other@example.com", "04tA").await.unwrap());
        assert_eq!(gw.count_calls(|c| matches!(c, GatewayCall::ListInstalled { .. })), 2);

        walker.invalidate_installed(ORG);
        walker.is_installed(&gw, ORG, "04tA").await.unwrap();
        assert_eq!(gw.count_calls(|c| matches!(c, GatewayCall::ListInstalled { .. })), 3);
    }

    #[test]
    fn test_enter_detects_cycle() {
        let mut walker = DependencyWalker::new(None);
        walker.enter("04tA").unwrap();
        walker.enter("04tB").unwrap();
        let err = walker.enter("04tA").unwrap_err();
        assert_eq!(
            err.downcast_ref::<DxpmError>(),
            Some(&DxpmError::CyclicDependency {
                chain: vec!["04tA".into(), "04tB".into(), "04tA".into()]
            })
        );
    }

    #[test]
    fn test_siblings_may_share_dependencies() {
        let mut walker = DependencyWalker::new(None);
        walker.enter("04tP").unwrap();
        walker.enter("04tShared").unwrap();
        walker.leave("04tShared");
        walker.enter("04tShared").unwrap();
        assert_eq!(walker.path(), ["04tP".to_string(), "04tShared".to_string()]);
    }
}
