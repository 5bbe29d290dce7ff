//! Manifest preservation and locking tests

use std::time::Duration;

use anyhow::Result;
use dxpm_cli::core::DxpmError;
use dxpm_cli::manifest::ManifestSync;
use serde_json::json;

use crate::common::{ProjectBuilder, TestProject, standard_gateway};

#[tokio::test]
async fn test_unknown_fields_survive_install() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        &ProjectBuilder::new()
            .package_directory("force-app", Some("MyApp"))
            .package_directory("unpackaged", None)
            .field("plugins", json!({ "sfdx-scanner": { "enabled": true } }))
            .alias("MyApp", "0Ho000000000001")
            .build(),
    )?;
    let gateway = standard_gateway();

    project.installer(&gateway).install("dev", "Dep2").await?;

    let written = project.manifest_json()?;
    assert_eq!(written["plugins"], json!({ "sfdx-scanner": { "enabled": true } }));
    assert_eq!(written["sourceApiVersion"], json!("48.0"));
    assert_eq!(written["packageDirectories"][0]["versionNumber"], json!("1.0.0.NEXT"));
    assert_eq!(written["packageDirectories"][0]["dependencies"], json!([{ "package": "Dep2" }]));
    assert_eq!(written["packageDirectories"][1], json!({ "path": "unpackaged", "default": false }));
    assert_eq!(written["packageAliases"]["MyApp"], json!("0Ho000000000001"));
    assert_eq!(written["packageAliases"]["Dep2"], json!("04tD2"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_writers_wait_for_held_lock() -> Result<()> {
    use fs4::fs_std::FileExt;

    let project = TestProject::new()?;
    let path = project.manifest_path();

    // Hold the lock the way another dxpm process would
    let lock_dir = project.project_path().join(".sfdx");
    std::fs::create_dir_all(&lock_dir)?;
    let held = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(lock_dir.join("dxpm.lock"))?;
    held.lock_exclusive()?;

    let mut handles = Vec::new();
    for i in 0..8 {
        let sync = ManifestSync::new(&path);
        handles.push(tokio::spawn(async move {
            sync.upsert(&format!("Pkg{i}"), &format!("04t{i}")).await
        }));
    }

    // Workers block on the lock, so the wait must not need the runtime
    std::thread::sleep(Duration::from_millis(200));
    assert!(handles.iter().all(|h| !h.is_finished()));
    assert!(project.read_manifest()?.dependencies().is_empty());

    drop(held);
    for handle in handles {
        handle.await??;
    }

    let manifest = project.read_manifest()?;
    assert_eq!(manifest.dependencies().len(), 8);
    for i in 0..8 {
        assert_eq!(manifest.alias(&format!("Pkg{i}")), Some(format!("04t{i}").as_str()));
    }
    Ok(())
}

#[tokio::test]
async fn test_manifest_without_package_directories() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(r#"{ "packageDirectories": [], "packageAliases": {} }"#)?;
    let gateway = standard_gateway();

    let err = project.installer(&gateway).install("dev", "Dep2").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DxpmError>(),
        Some(DxpmError::ManifestIoFailure { .. })
    ));
    Ok(())
}
