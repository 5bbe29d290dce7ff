//! Deterministic in-memory [`Gateway`] for unit and integration tests.
//!
//! [`FakeGateway`] is configured with builder methods and records every call
//! it receives, so tests can assert both on outcomes and on the exact order of
//! install and uninstall actions.
//!
//! ```rust,ignore
//! use dxpm_cli::test_utils::{FakeGateway, GatewayCall};
//!
//! let gateway = FakeGateway::new()
//!     .with_org("00D1", "hub@example.com", Some("hub"), true)
//!     .with_package("Parent", "033P", "0HoP", "04tP", "1.0", &["04tD"])
//!     .with_package("Dep", "033D", "0HoD", "04tD", "1.0", &[]);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use serde_json::{Value, json};

use crate::core::DxpmError;
use crate::sfdx::{
    DEFAULT_DEV_HUB_MARKER, Gateway, InstalledPackage, Org, OrgList, PackageVersion, QueryResult,
    ScratchOrg,
};

/// A call received by [`FakeGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ListOrgs,
    ListPackageVersions,
    ListInstalled { org: String },
    Query { org: String, soql: String },
    Install { org: String, version_id: String, wait_minutes: u32 },
    Uninstall { org: String, version_id: String },
    CreateScratchOrg { definition: PathBuf, alias: String },
}

#[derive(Debug, Default)]
struct State {
    orgs: OrgList,
    versions: Vec<PackageVersion>,
    // id -> (entity, record)
    records: HashMap<String, (String, Value)>,
    duplicates: HashSet<String>,
    installed: HashMap<String, Vec<InstalledPackage>>,
    failing_installs: HashSet<String>,
    version_list_error: Option<String>,
    calls: Vec<GatewayCall>,
}

/// In-memory stand-in for the `sfdx` CLI.
#[derive(Debug)]
pub struct FakeGateway {
    available: bool,
    state: Mutex<State>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            available: true,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make [`Gateway::ensure_available`] fail.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Add a persistent org.
    pub fn with_org(
        self,
        org_id: &str,
        username: &str,
        alias: Option<&str>,
        default_dev_hub: bool,
    ) -> Self {
        self.state().orgs.non_scratch_orgs.push(Org {
            username: username.to_string(),
            org_id: org_id.to_string(),
            is_dev_hub: default_dev_hub,
            alias: alias.map(str::to_string),
            default_marker: default_dev_hub.then(|| DEFAULT_DEV_HUB_MARKER.to_string()),
            ..Org::default()
        });
        self
    }

    /// Add a scratch org.
    pub fn with_scratch_org(self, org_id: &str, username: &str, alias: Option<&str>) -> Self {
        self.state().orgs.scratch_orgs.push(ScratchOrg {
            username: username.to_string(),
            org_id: org_id.to_string(),
            alias: alias.map(str::to_string),
            status: Some("Active".to_string()),
            ..ScratchOrg::default()
        });
        self
    }

    /// Add an entry to the dev hub's package version list.
    pub fn with_package_version(
        self,
        name: &str,
        package_id: &str,
        version_id: &str,
        version: &str,
    ) -> Self {
        self.state().versions.push(PackageVersion {
            package_name: name.to_string(),
            id: version_id.to_string(),
            package_id: package_id.to_string(),
            version_name: format!("ver {version}"),
            version: version.to_string(),
        });
        self
    }

    /// Make a version queryable, along with its owning `SubscriberPackage`.
    pub fn with_subscriber_version(
        self,
        version_id: &str,
        subscriber_package_id: &str,
        name: &str,
        dependencies: &[&str],
    ) -> Self {
        let ids: Vec<Value> = dependencies
            .iter()
            .map(|id| json!({ "subscriberPackageVersionId": id }))
            .collect();
        let dependencies = if ids.is_empty() { Value::Null } else { json!({ "ids": ids }) };
        {
            let mut state = self.state();
            state.records.insert(
                version_id.to_string(),
                (
                    "SubscriberPackageVersion".to_string(),
                    json!({
                        "Id": version_id,
                        "SubscriberPackageId": subscriber_package_id,
                        "MajorVersion": 1,
                        "MinorVersion": 0,
                        "PatchVersion": 0,
                        "BuildNumber": 1,
                        "Package2ContainerOptions": "Unlocked",
                        "Dependencies": dependencies,
                    }),
                ),
            );
            state.records.insert(
                subscriber_package_id.to_string(),
                ("SubscriberPackage".to_string(), json!({ "Name": name })),
            );
        }
        self
    }

    /// Register a package both in the version list and as queryable metadata.
    pub fn with_package(
        self,
        name: &str,
        subscriber_package_id: &str,
        package_id: &str,
        version_id: &str,
        version: &str,
        dependencies: &[&str],
    ) -> Self {
        self.with_package_version(name, package_id, version_id, version)
            .with_subscriber_version(version_id, subscriber_package_id, name, dependencies)
    }

    /// Make queries for `id` return two records.
    pub fn with_duplicate_record(self, id: &str) -> Self {
        self.state().duplicates.insert(id.to_string());
        self
    }

    /// Mark `version_id` as already installed in `org`.
    pub fn with_installed(self, org: &str, version_id: &str) -> Self {
        self.state().mark_installed(org, version_id);
        self
    }

    /// Make installing `version_id` fail.
    pub fn failing_install(self, version_id: &str) -> Self {
        self.state().failing_installs.insert(version_id.to_string());
        self
    }

    /// Make [`Gateway::list_package_versions`] fail with `message`, as it does
    /// when no dev hub is authorized.
    pub fn failing_version_list(self, message: &str) -> Self {
        self.state().version_list_error = Some(message.to_string());
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, predicate: impl Fn(&GatewayCall) -> bool) -> usize {
        self.state().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Version ids passed to install actions, in order.
    pub fn installs(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                GatewayCall::Install { version_id, .. } => Some(version_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Version ids passed to uninstall actions, in order.
    pub fn uninstalls(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                GatewayCall::Uninstall { version_id, .. } => Some(version_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether `version_id` is currently installed in `org`.
    pub fn is_installed(&self, org: &str, version_id: &str) -> bool {
        self.state()
            .installed
            .get(org)
            .is_some_and(|list| list.iter().any(|p| p.version_id == version_id))
    }
}

impl State {
    fn mark_installed(&mut self, org: &str, version_id: &str) {
        let (package_id, package_name) = self
            .versions
            .iter()
            .find(|v| v.id == version_id)
            .map(|v| (v.package_id.clone(), v.package_name.clone()))
            .unwrap_or_default();
        let list = self.installed.entry(org.to_string()).or_default();
        if !list.iter().any(|p| p.version_id == version_id) {
            list.push(InstalledPackage {
                id: format!("0A3{}", list.len()),
                package_id,
                package_name,
                version_id: version_id.to_string(),
            });
        }
    }
}

fn parse_query(soql: &str) -> Option<(&str, &str)> {
    let (_, rest) = soql.split_once(" FROM ")?;
    let (entity, rest) = rest.split_once(" WHERE ")?;
    let (_, rest) = rest.split_once("Id='")?;
    let (id, _) = rest.split_once('\'')?;
    Some((entity.trim(), id))
}

impl Gateway for FakeGateway {
    fn tool_name(&self) -> &str {
        "sfdx"
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(DxpmError::ToolNotFound {
                tool: self.tool_name().to_string(),
            }
            .into())
        }
    }

    async fn list_orgs(&self) -> Result<OrgList> {
        let mut state = self.state();
        state.calls.push(GatewayCall::ListOrgs);
        Ok(state.orgs.clone())
    }

    async fn list_package_versions(&self) -> Result<Vec<PackageVersion>> {
        let mut state = self.state();
        state.calls.push(GatewayCall::ListPackageVersions);
        if let Some(message) = &state.version_list_error {
            return Err(DxpmError::SubprocessFailure {
                command: "sfdx force:package:version:list --json".to_string(),
                message: message.clone(),
            }
            .into());
        }
        Ok(state.versions.clone())
    }

    async fn list_installed_packages(&self, org: &str) -> Result<Vec<InstalledPackage>> {
        let mut state = self.state();
        state.calls.push(GatewayCall::ListInstalled {
            org: org.to_string(),
        });
        Ok(state.installed.get(org).cloned().unwrap_or_default())
    }

    async fn query(&self, org: &str, soql: &str) -> Result<QueryResult> {
        let mut state = self.state();
        state.calls.push(GatewayCall::Query {
            org: org.to_string(),
            soql: soql.to_string(),
        });

        let Some((entity, id)) = parse_query(soql) else {
            return Err(DxpmError::SubprocessFailure {
                command: "query".to_string(),
                message: format!("malformed SOQL: {soql}"),
            }
            .into());
        };

        let mut records = match state.records.get(id) {
            Some((kind, record)) if kind == entity => vec![record.clone()],
            _ => Vec::new(),
        };
        if state.duplicates.contains(id) {
            if let Some(first) = records.first().cloned() {
                records.push(first);
            }
        }

        Ok(QueryResult {
            size: records.len(),
            entity_type_name: entity.to_string(),
            records,
        })
    }

    async fn install_package(&self, org: &str, version_id: &str, wait_minutes: u32) -> Result<()> {
        let mut state = self.state();
        state.calls.push(GatewayCall::Install {
            org: org.to_string(),
            version_id: version_id.to_string(),
            wait_minutes,
        });
        if state.failing_installs.contains(version_id) {
            return Err(DxpmError::SubprocessFailure {
                command: format!("sfdx force:package:install --package {version_id} -u {org}"),
                message: "exited with exit status: 1".to_string(),
            }
            .into());
        }
        state.mark_installed(org, version_id);
        Ok(())
    }

    async fn uninstall_package(&self, org: &str, version_id: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(GatewayCall::Uninstall {
            org: org.to_string(),
            version_id: version_id.to_string(),
        });
        if let Some(list) = state.installed.get_mut(org) {
            list.retain(|p| p.version_id != version_id);
        }
        Ok(())
    }

    async fn create_scratch_org(&self, definition_file: &Path, alias: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(GatewayCall::CreateScratchOrg {
            definition: definition_file.to_path_buf(),
            alias: alias.to_string(),
        });
        let index = state.orgs.scratch_orgs.len();
        state.orgs.scratch_orgs.push(ScratchOrg {
            username: format!("{alias}@scratch.example.com"),
            org_id: format!("00DSCRATCH{index:05}"),
            alias: Some(alias.to_string()),
            status: Some("Active".to_string()),
            ..ScratchOrg::default()
        });
        Ok(())
    }
}
