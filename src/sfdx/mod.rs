//! Gateway to the external `sfdx` command-line tool.
//!
//! Everything dxpm knows about orgs and packages comes through the
//! [`Gateway`] trait. [`SfdxCli`] implements it by spawning `sfdx` once per
//! call: query calls append `--json` and parse the `{status, result}`
//! envelope, action calls stream the tool's output straight to the console.
//! There are no retries; a failed call surfaces as
//! [`DxpmError::SubprocessFailure`].
//!
//! Tests swap in the deterministic fake from [`crate::test_utils`].

pub mod types;

use std::future::Future;
use std::path::Path;
use std::process::Stdio;

use anyhow::Result;
use serde::de::DeserializeOwned;
use tokio::process::Command;

use crate::core::DxpmError;

pub use types::{
    ContainerType, DEFAULT_DEV_HUB_MARKER, InstalledPackage, Org, OrgIdentity, OrgList,
    PackageVersion, QueryResult,
    ScratchOrg, SubscriberPackage, SubscriberPackageVersion,
};

/// Default name of the external tool binary.
pub const DEFAULT_BINARY: &str = "sfdx";

/// Prefix of canonical package version ids.
pub const VERSION_ID_PREFIX: &str = "04t";

/// Prefix of package ids.
pub const PACKAGE_ID_PREFIX: &str = "0Ho";

/// Prefix of org ids.
pub const ORG_ID_PREFIX: &str = "00D";

/// Typed boundary between the orchestrator and the live environment.
pub trait Gateway {
    /// Name of the tool, used in error messages.
    fn tool_name(&self) -> &str;

    /// Fail with [`DxpmError::ToolNotFound`] unless the tool can be run.
    fn ensure_available(&self) -> Result<()>;

    /// Every authorized org, persistent and scratch.
    fn list_orgs(&self) -> impl Future<Output = Result<OrgList>>;

    /// Every package version visible to the default dev hub.
    fn list_package_versions(&self) -> impl Future<Output = Result<Vec<PackageVersion>>>;

    /// Package versions currently installed in `org`.
    fn list_installed_packages(
        &self,
        org: &str,
    ) -> impl Future<Output = Result<Vec<InstalledPackage>>>;

    /// Run a tooling-API SOQL query against `org`.
    fn query(&self, org: &str, soql: &str) -> impl Future<Output = Result<QueryResult>>;

    /// Install `version_id` into `org`, waiting up to `wait_minutes`.
    fn install_package(
        &self,
        org: &str,
        version_id: &str,
        wait_minutes: u32,
    ) -> impl Future<Output = Result<()>>;

    /// Uninstall `version_id` from `org`.
    fn uninstall_package(&self, org: &str, version_id: &str) -> impl Future<Output = Result<()>>;

    /// Create a scratch org from a definition file and alias it.
    fn create_scratch_org(
        &self,
        definition_file: &Path,
        alias: &str,
    ) -> impl Future<Output = Result<()>>;
}

/// Run a query that must match exactly one record and decode it.
///
/// Zero records is a [`DxpmError::ResolutionFailure`]; more than one is a
/// [`DxpmError::MultipleRecordsFailure`]. Record ids are alphanumeric, so any
/// other `id` is reported as unresolvable without running a query.
pub async fn query_single<G, T>(gateway: &G, org: &str, entity: &str, id: &str, fields: &str) -> Result<T>
where
    G: Gateway,
    T: DeserializeOwned,
{
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        tracing::debug!(target: "dxpm::sfdx", "rejecting malformed {entity} id {id:?}");
        return Err(DxpmError::resolution(entity, id).into());
    }

    let soql = format!("SELECT {fields} FROM {entity} WHERE Id='{id}'");
    let result = gateway.query(org, &soql).await?;

    match result.records.len().max(result.size) {
        0 => Err(DxpmError::resolution(entity, id).into()),
        1 => {
            let record = result
                .records
                .into_iter()
                .next()
                .ok_or_else(|| DxpmError::resolution(entity, id))?;
            serde_json::from_value(record).map_err(|e| {
                DxpmError::SubprocessFailure {
                    command: format!("query {entity}"),
                    message: format!("unexpected record shape: {e}"),
                }
                .into()
            })
        }
        count => Err(DxpmError::MultipleRecordsFailure {
            entity: entity.to_string(),
            id: id.to_string(),
            count,
        }
        .into()),
    }
}

/// [`Gateway`] backed by the real `sfdx` binary.
#[derive(Debug, Clone)]
pub struct SfdxCli {
    binary: String,
}

impl Default for SfdxCli {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl SfdxCli {
    /// Use `binary` (a name on `PATH` or an absolute path).
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn render(&self, args: &[&str]) -> String {
        let mut line = self.binary.clone();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Run an action with stdout inherited.
    async fn run(&self, args: &[&str]) -> Result<()> {
        let command = self.render(args);
        tracing::debug!(target: "dxpm::sfdx", "running {command}");

        let status = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| DxpmError::SubprocessFailure {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(DxpmError::SubprocessFailure {
                command,
                message: format!("exited with {status}"),
            }
            .into());
        }
        Ok(())
    }

    /// Run a query with `--json` and decode the envelope's `result`.
    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let mut full: Vec<&str> = args.to_vec();
        full.push("--json");
        let command = self.render(&full);
        tracing::debug!(target: "dxpm::sfdx", "querying {command}");

        let output = Command::new(&self.binary)
            .args(&full)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| DxpmError::SubprocessFailure {
                command: command.clone(),
                message: e.to_string(),
            })?;

        let failure = |message: String| DxpmError::SubprocessFailure {
            command: command.clone(),
            message,
        };

        let envelope: types::Envelope<T> = match serde_json::from_slice(&output.stdout) {
            Ok(envelope) => envelope,
            Err(e) if output.status.success() => {
                return Err(failure(format!("invalid JSON response: {e}")).into());
            }
            Err(_) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                return Err(failure(format!("exited with {}: {stderr}", output.status)).into());
            }
        };

        if envelope.status != 0 || !output.status.success() {
            let message = envelope
                .message
                .or(envelope.name)
                .unwrap_or_else(|| format!("status {}", envelope.status));
            return Err(failure(message).into());
        }

        envelope
            .result
            .ok_or_else(|| failure("response has no result".to_string()).into())
    }
}

impl Gateway for SfdxCli {
    fn tool_name(&self) -> &str {
        &self.binary
    }

    fn ensure_available(&self) -> Result<()> {
        which::which(&self.binary).map_err(|_| DxpmError::ToolNotFound {
            tool: self.binary.clone(),
        })?;
        Ok(())
    }

    async fn list_orgs(&self) -> Result<OrgList> {
        self.run_json(&["force:org:list"]).await
    }

    async fn list_package_versions(&self) -> Result<Vec<PackageVersion>> {
        self.run_json(&["force:package:version:list"]).await
    }

    async fn list_installed_packages(&self, org: &str) -> Result<Vec<InstalledPackage>> {
        self.run_json(&["force:package:installed:list", "-u", org]).await
    }

    async fn query(&self, org: &str, soql: &str) -> Result<QueryResult> {
        self.run_json(&["force:data:soql:query", "-u", org, "-t", "-q", soql]).await
    }

    async fn install_package(&self, org: &str, version_id: &str, wait_minutes: u32) -> Result<()> {
        let wait = wait_minutes.to_string();
        self.run(&["force:package:install", "--package", version_id, "-u", org, "-w", &wait])
            .await
    }

    async fn uninstall_package(&self, org: &str, version_id: &str) -> Result<()> {
        self.run(&["force:package:uninstall", "--package", version_id, "-u", org]).await
    }

    async fn create_scratch_org(&self, definition_file: &Path, alias: &str) -> Result<()> {
        let file = definition_file.to_string_lossy();
        self.run(&["force:org:create", "-f", &file, "-a", alias]).await
    }
}
