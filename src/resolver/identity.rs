//! Alias resolution for orgs and package versions.
//!
//! Users name orgs by alias, org id or username, and packages by name,
//! `name@version`, package id or version id. [`IdentityResolver`] turns those
//! into the canonical identities the gateway understands: an org username and
//! a subscriber package version id (`04t...`).
//!
//! Inputs already in canonical form are returned without touching the
//! gateway. Otherwise the full org or version listing is fetched once and kept
//! in a [`Cached`] until [`IdentityResolver::reset`] or the TTL expires.

use std::time::Duration;

use anyhow::{Context, Result};

use super::cache::Cached;
use crate::core::DxpmError;
use crate::sfdx::{
    Gateway, ORG_ID_PREFIX, Org, OrgIdentity, OrgList, PACKAGE_ID_PREFIX, PackageVersion,
    VERSION_ID_PREFIX,
};
use crate::version::VersionOrdering;

/// Version suffix meaning "whatever is newest".
pub const LATEST: &str = "LATEST";

/// Resolves org and package aliases with per-run caches.
#[derive(Debug, Default)]
pub struct IdentityResolver {
    orgs: Cached<OrgList>,
    versions: Cached<Vec<PackageVersion>>,
    ordering: VersionOrdering,
}

impl IdentityResolver {
    /// Create a resolver. `ttl` bounds how long listings are trusted.
    pub fn new(ordering: VersionOrdering, ttl: Option<Duration>) -> Self {
        Self {
            orgs: Cached::new(ttl),
            versions: Cached::new(ttl),
            ordering,
        }
    }

    /// Forget every cached listing.
    pub fn reset(&mut self) {
        self.orgs.reset();
        self.versions.reset();
    }

    /// Forget the org listing only, e.g. after creating a scratch org.
    pub fn reset_orgs(&mut self) {
        self.orgs.reset();
    }

    async fn org_list<G: Gateway>(&mut self, gateway: &G) -> Result<&OrgList> {
        if !self.orgs.is_loaded() {
            tracing::debug!(target: "dxpm::resolver", "loading org list");
            let list = gateway.list_orgs().await?;
            self.orgs.set(list);
        }
        self.orgs.get().context("org list cache is empty")
    }

    async fn version_list<G: Gateway>(&mut self, gateway: &G) -> Result<&[PackageVersion]> {
        if !self.versions.is_loaded() {
            tracing::debug!(target: "dxpm::resolver", "loading package version list");
            let list = gateway.list_package_versions().await?;
            self.versions.set(list);
        }
        self.versions.get().map(Vec::as_slice).context("package version cache is empty")
    }

    /// Resolve an org alias, org id or username to the org's username.
    ///
    /// Anything containing `@` is taken to be a username already. Persistent
    /// orgs are searched before scratch orgs; the first match wins.
    pub async fn resolve_org<G: Gateway>(&mut self, gateway: &G, alias: &str) -> Result<String> {
        if alias.contains('@') {
            return Ok(alias.to_string());
        }

        let orgs = self.org_list(gateway).await?;
        let by_id = alias.starts_with(ORG_ID_PREFIX);
        let matches = |org: &dyn OrgIdentity| {
            if by_id { org.org_id() == alias } else { org.alias() == Some(alias) }
        };

        let username = orgs
            .non_scratch_orgs
            .iter()
            .map(|o| o as &dyn OrgIdentity)
            .chain(orgs.scratch_orgs.iter().map(|o| o as &dyn OrgIdentity))
            .find(|o| matches(*o))
            .map(|o| o.username().to_string())
            .ok_or_else(|| DxpmError::resolution("environment", alias))?;

        tracing::debug!(target: "dxpm::resolver", "org '{alias}' resolved to {username}");
        Ok(username)
    }

    /// Resolve a package input to a subscriber package version id.
    ///
    /// Accepted forms:
    /// - `04t...` - a version id, returned as is
    /// - `0Ho...` - a package id; its latest version is selected
    /// - `name` or `name@LATEST` - the latest version of that package
    /// - `name@version` - exactly that version string
    pub async fn resolve_package_version<G: Gateway>(
        &mut self,
        gateway: &G,
        alias: &str,
    ) -> Result<String> {
        if alias.starts_with(VERSION_ID_PREFIX) {
            return Ok(alias.to_string());
        }

        let ordering = self.ordering;
        let versions = self.version_list(gateway).await?;
        let by_package_id = alias.starts_with(PACKAGE_ID_PREFIX);

        let (name, requested) = match alias.split_once('@') {
            Some((name, version)) if !by_package_id => (name, version),
            _ => (alias, LATEST),
        };

        let mut candidates = versions.iter().filter(|v| {
            if by_package_id { v.package_id == name } else { v.package_name == name }
        });

        let selected = if requested == LATEST {
            ordering.latest(candidates, |v| v.version.as_str())
        } else {
            candidates.find(|v| v.version == requested)
        };

        let version = selected.ok_or_else(|| DxpmError::resolution("package", alias))?;
        tracing::debug!(
            target: "dxpm::resolver",
            "package '{alias}' resolved to {} ({} {})",
            version.id,
            version.package_name,
            version.version
        );
        Ok(version.id.clone())
    }

    /// Look up a version in the dev hub's version list by its id.
    pub async fn package_version<G: Gateway>(
        &mut self,
        gateway: &G,
        version_id: &str,
    ) -> Result<Option<PackageVersion>> {
        let versions = self.version_list(gateway).await?;
        Ok(versions.iter().find(|v| v.id == version_id).cloned())
    }

    /// The org marked as default dev hub.
    pub async fn default_dev_hub<G: Gateway>(&mut self, gateway: &G) -> Result<Org> {
        let orgs = self.org_list(gateway).await?;
        orgs.non_scratch_orgs
            .iter()
            .find(|o| o.is_default_dev_hub())
            .cloned()
            .ok_or_else(|| DxpmError::NoDefaultDevHub.into())
    }

    /// Find an org (persistent or scratch) by its org id.
    pub async fn find_org_by_id<G: Gateway>(
        &mut self,
        gateway: &G,
        org_id: &str,
    ) -> Result<(String, String)> {
        let orgs = self.org_list(gateway).await?;
        orgs.non_scratch_orgs
            .iter()
            .map(|o| o as &dyn OrgIdentity)
            .chain(orgs.scratch_orgs.iter().map(|o| o as &dyn OrgIdentity))
            .find(|o| o.org_id() == org_id)
            .map(|o| (o.org_id().to_string(), o.username().to_string()))
            .ok_or_else(|| DxpmError::resolution("environment", org_id).into())
    }
}
