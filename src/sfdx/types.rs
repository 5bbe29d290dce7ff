//! Wire types for the `sfdx --json` responses dxpm consumes.
//!
//! Org listings use camelCase keys; package listings and SOQL records use the
//! PascalCase field names of the Salesforce objects.

use serde::{Deserialize, Serialize};

/// Marker `sfdx force:org:list` puts on the default dev hub.
pub const DEFAULT_DEV_HUB_MARKER: &str = "(D)";

/// Response envelope of every `--json` call.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Zero on success
    pub status: i32,
    /// Command payload; absent on failure
    pub result: Option<T>,
    /// Failure message
    pub message: Option<String>,
    /// Failure name, e.g. `NoOrgFound`
    pub name: Option<String>,
}

/// A non-scratch (persistent) org.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Org {
    pub username: String,
    pub org_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub is_dev_hub: bool,
    pub alias: Option<String>,
    pub default_marker: Option<String>,
}

impl Org {
    /// True for the org `sfdx` marks as the default dev hub.
    pub fn is_default_dev_hub(&self) -> bool {
        self.is_dev_hub && self.default_marker.as_deref() == Some(DEFAULT_DEV_HUB_MARKER)
    }
}

/// An ephemeral scratch org.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScratchOrg {
    pub username: String,
    pub org_id: String,
    pub dev_hub_org_id: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub alias: Option<String>,
    pub status: Option<String>,
    pub is_expired: bool,
    pub expiration_date: Option<String>,
}

/// Result of `force:org:list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrgList {
    pub non_scratch_orgs: Vec<Org>,
    pub scratch_orgs: Vec<ScratchOrg>,
}

/// Identity fields shared by both org kinds, used for alias matching.
pub trait OrgIdentity {
    fn org_id(&self) -> &str;
    fn alias(&self) -> Option<&str>;
    fn username(&self) -> &str;
}

impl OrgIdentity for Org {
    fn org_id(&self) -> &str {
        &self.org_id
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn username(&self) -> &str {
        &self.username
    }
}

impl OrgIdentity for ScratchOrg {
    fn org_id(&self) -> &str {
        &self.org_id
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn username(&self) -> &str {
        &self.username
    }
}

/// An entry of `force:package:version:list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageVersion {
    /// Owning package name
    #[serde(rename = "Package2Name")]
    pub package_name: String,
    /// Canonical version id (`04t...`)
    #[serde(rename = "SubscriberPackageVersionId")]
    pub id: String,
    /// Owning package id (`0Ho...`)
    #[serde(rename = "Package2Id")]
    pub package_id: String,
    /// Human version name, e.g. `ver 1.2`
    #[serde(rename = "Name")]
    pub version_name: String,
    /// Version string, e.g. `1.2.0.3`
    #[serde(rename = "Version")]
    pub version: String,
}

/// Container type of a subscriber package version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerType {
    Managed,
    #[default]
    Unlocked,
    #[serde(other)]
    Other,
}

/// One entry of a version's `Dependencies.ids` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRef {
    #[serde(rename = "subscriberPackageVersionId")]
    pub subscriber_package_version_id: String,
}

/// `Dependencies` field of a `SubscriberPackageVersion` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependencies {
    pub ids: Vec<DependencyRef>,
}

/// A `SubscriberPackageVersion` tooling-API record.
///
/// `name` is not part of the record; it is filled in from the owning
/// `SubscriberPackage` after the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberPackageVersion {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "SubscriberPackageId")]
    pub package_id: String,
    #[serde(rename = "MajorVersion")]
    pub major_version: u32,
    #[serde(rename = "MinorVersion")]
    pub minor_version: u32,
    #[serde(rename = "PatchVersion")]
    pub patch_version: u32,
    #[serde(rename = "BuildNumber")]
    pub build_number: u32,
    #[serde(rename = "Package2ContainerOptions")]
    pub container: ContainerType,
    #[serde(rename = "Dependencies", deserialize_with = "null_as_default")]
    pub dependencies: Dependencies,
}

impl SubscriberPackageVersion {
    /// Direct dependency version ids, in declared order.
    pub fn dependency_ids(&self) -> impl Iterator<Item = &str> {
        self.dependencies.ids.iter().map(|d| d.subscriber_package_version_id.as_str())
    }

    /// `major.minor.patch.build`
    pub fn version_number(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.major_version, self.minor_version, self.patch_version, self.build_number
        )
    }
}

/// A `SubscriberPackage` tooling-API record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubscriberPackage {
    #[serde(rename = "Name")]
    pub name: String,
}

/// An entry of `force:package:installed:list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstalledPackage {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "SubscriberPackageId")]
    pub package_id: String,
    #[serde(rename = "SubscriberPackageName")]
    pub package_name: String,
    #[serde(rename = "SubscriberPackageVersionId")]
    pub version_id: String,
}

/// Result of `force:data:soql:query`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResult {
    pub size: usize,
    pub entity_type_name: String,
    pub records: Vec<serde_json::Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
