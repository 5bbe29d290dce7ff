//! Install workflow tests

use anyhow::Result;
use dxpm_cli::core::DxpmError;
use dxpm_cli::installer::{InstallOptions, Installer};
use dxpm_cli::test_utils::{FakeGateway, GatewayCall};

use crate::common::{DEV_ORG, ProjectBuilder, TestProject, standard_gateway};

#[tokio::test]
async fn test_install_orders_dependencies_depth_first() -> Result<()> {
    let project = TestProject::new()?;
    let gateway = standard_gateway();

    let mut installer = project.installer(&gateway);
    installer.install("dev", "Parent").await?;

    assert_eq!(gateway.installs(), vec!["04tD3", "04tD1", "04tD2", "04tP"]);
    assert_eq!(project.dependency_names()?, vec!["Dep3", "Dep1", "Dep2", "Parent"]);

    let manifest = project.read_manifest()?;
    for (name, id) in [("Dep3", "04tD3"), ("Dep1", "04tD1"), ("Dep2", "04tD2"), ("Parent", "04tP")] {
        assert_eq!(manifest.alias(name), Some(id));
    }
    Ok(())
}

#[tokio::test]
async fn test_install_twice_is_idempotent() -> Result<()> {
    let project = TestProject::new()?;
    let gateway = standard_gateway();

    project.installer(&gateway).install("dev", "Parent").await?;
    let first = std::fs::read_to_string(project.manifest_path())?;

    // A fresh installer has cold caches, as a second command invocation would
    let report = project.installer(&gateway).install("dev", "Parent").await?;
    let second = std::fs::read_to_string(project.manifest_path())?;

    assert!(report.installed.is_empty());
    assert_eq!(report.already_installed.len(), 4);
    assert_eq!(gateway.installs().len(), 4);
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_install_partial_failure_then_rerun() -> Result<()> {
    let project = TestProject::new()?;
    let failing = standard_gateway().failing_install("04tD2");

    let err = project.installer(&failing).install("dev", "Parent").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DxpmError>(),
        Some(DxpmError::SubprocessFailure { .. })
    ));
    // D3 and D1 were installed and recorded before the failure; P was never touched
    assert_eq!(failing.installs(), vec!["04tD3", "04tD1", "04tD2"]);
    assert_eq!(project.dependency_names()?, vec!["Dep3", "Dep1"]);

    // Rerun against an org where D3 and D1 are already present
    let gateway = standard_gateway().with_installed(DEV_ORG, "04tD3").with_installed(DEV_ORG, "04tD1");
    let report = project.installer(&gateway).install("dev", "Parent").await?;
    assert_eq!(report.installed, vec!["04tD2", "04tP"]);
    assert_eq!(project.dependency_names()?, vec!["Dep3", "Dep1", "Dep2", "Parent"]);
    Ok(())
}

#[tokio::test]
async fn test_canonical_inputs_skip_listings() -> Result<()> {
    let project = TestProject::new()?;
    let gateway = standard_gateway();

    project.installer(&gateway).install(DEV_ORG, "04tD3").await?;

    assert_eq!(gateway.count_calls(|c| matches!(c, GatewayCall::ListOrgs)), 0);
    assert_eq!(gateway.count_calls(|c| matches!(c, GatewayCall::ListPackageVersions)), 0);
    assert_eq!(gateway.installs(), vec!["04tD3"]);
    Ok(())
}

#[tokio::test]
async fn test_install_by_version_and_package_id() -> Result<()> {
    let project = TestProject::new()?;
    let gateway = standard_gateway()
        .with_package("Dep3", "033D3", "0HoD3", "04tD3v2", "1.0.0.10", &[])
        .with_package("Dep3", "033D3", "0HoD3", "04tD3v3", "1.0.0.9", &[]);

    project.installer(&gateway).install("dev", "Dep3@1.0.0.9").await?;
    assert_eq!(project.read_manifest()?.alias("Dep3"), Some("04tD3v3"));

    project.installer(&gateway).install("00D000000000002", "0HoD3").await?;
    assert_eq!(project.read_manifest()?.alias("Dep3"), Some("04tD3v2"));
    assert_eq!(project.dependency_names()?, vec!["Dep3"]);
    Ok(())
}

#[tokio::test]
async fn test_unknown_package_fails_before_any_action() -> Result<()> {
    let project = TestProject::new()?;
    let gateway = standard_gateway();

    let err = project.installer(&gateway).install("dev", "Missing@LATEST").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to locate package with alias: Missing@LATEST"
    );
    assert!(gateway.installs().is_empty());
    assert!(project.dependency_names()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_circular_dependency_is_an_error() -> Result<()> {
    let project = TestProject::new()?;
    let gateway = FakeGateway::new()
        .with_package("A", "033A", "0HoA", "04tA", "1.0", &["04tB"])
        .with_package("B", "033B", "0HoB", "04tB", "1.0", &["04tC"])
        .with_package("C", "033C", "0HoC", "04tC", "1.0", &["04tA"]);

    let err = project.installer(&gateway).install(DEV_ORG, "A").await.unwrap_err();
    assert_eq!(err.to_string(), "Circular package dependency: 04tA -> 04tB -> 04tC -> 04tA");
    assert!(gateway.installs().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_install_project_dependencies() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        &ProjectBuilder::new()
            .package_directory("force-app", Some("MyApp"))
            .dependency("Dep1")
            .dependency("Dep2")
            .alias("Dep1", "04tD1")
            .build(),
    )?;
    let gateway = standard_gateway();

    let report = project.installer(&gateway).install_project("dev").await?;

    assert_eq!(report.installed, vec!["04tD3", "04tD1", "04tD2"]);
    assert_eq!(project.dependency_names()?, vec!["Dep1", "Dep2", "Dep3"]);
    assert_eq!(project.read_manifest()?.alias("Dep2"), Some("04tD2"));
    Ok(())
}

#[tokio::test]
async fn test_missing_tool_and_project() -> Result<()> {
    let project = TestProject::new()?;
    let gateway = FakeGateway::new().unavailable();
    let err = Installer::prepare(&gateway, project.project_path(), InstallOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err.downcast_ref::<DxpmError>(), Some(DxpmError::ToolNotFound { .. })));

    let outside = tempfile::TempDir::new()?;
    let gateway = standard_gateway();
    let err = Installer::prepare(&gateway, outside.path(), InstallOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err.downcast_ref::<DxpmError>(), Some(DxpmError::ProjectNotFound { .. })));
    Ok(())
}
