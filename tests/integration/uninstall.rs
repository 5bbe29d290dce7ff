//! Uninstall workflow tests

use anyhow::Result;
use dxpm_cli::test_utils::GatewayCall;

use crate::common::{DEV_ORG, TestProject, standard_gateway};

#[tokio::test]
async fn test_uninstall_removes_only_the_named_package() -> Result<()> {
    let project = TestProject::new()?;
    let gateway = standard_gateway();

    let mut installer = project.installer(&gateway);
    installer.install("dev", "Parent").await?;
    installer.uninstall("dev", "Parent").await?;

    // Not recursive: dependencies stay installed and recorded
    assert_eq!(gateway.uninstalls(), vec!["04tP"]);
    assert!(gateway.is_installed(DEV_ORG, "04tD1"));
    assert_eq!(project.dependency_names()?, vec!["Dep3", "Dep1", "Dep2"]);
    assert!(project.read_manifest()?.alias("Parent").is_none());
    Ok(())
}

#[tokio::test]
async fn test_uninstall_runs_even_when_not_installed() -> Result<()> {
    let project = TestProject::new()?;
    let gateway = standard_gateway();
    let before = std::fs::read_to_string(project.manifest_path())?;

    project.installer(&gateway).uninstall("dev", "Dep2").await?;

    assert!(gateway.calls().contains(&GatewayCall::Uninstall {
        org: DEV_ORG.into(),
        version_id: "04tD2".into(),
    }));
    // Removing an absent entry leaves the manifest content unchanged
    let after = std::fs::read_to_string(project.manifest_path())?;
    assert_eq!(project.manifest_json()?, serde_json::from_str::<serde_json::Value>(&before)?);
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn test_install_then_uninstall_restores_manifest() -> Result<()> {
    let project = TestProject::new()?;
    let gateway = standard_gateway();
    let before = project.manifest_json()?;

    let mut installer = project.installer(&gateway);
    installer.install("dev", "Dep2@1.0.0.1").await?;
    installer.uninstall("dev", "Dep2").await?;

    assert_eq!(project.manifest_json()?, before);
    Ok(())
}
