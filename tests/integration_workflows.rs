//! End-to-end workflow tests against temporary project trees.
//!
//! The package manager is replaced by stub executables (`true`, `false`,
//! or small scripts written per test), so every test exercises the real
//! artifact coordination without touching a network or a real registry.

use splm::core::SplmError;
use splm::project::Project;
use splm::workflows;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BASE_MODEL: &str = "imports\n    base_component\nfeatures\n    app\n        mandatory\n            base_component.WebApplication\n";

/// Create a minimal SPL project in `dir` with the given package manager.
fn spl_project(dir: &Path, package_manager: &str) {
    fs::write(
        dir.join("package.json"),
        "{\n  \"name\": \"app\",\n  \"dependencies\": {\n    \"base_component\": \"*\"\n  }\n}\n",
    )
    .unwrap();
    fs::write(dir.join("base.uvl"), BASE_MODEL).unwrap();
    fs::write(
        dir.join("splModules.json"),
        "[\n  {\n    \"name\": \"base_component\",\n    \"nameProject\": \"base_component\"\n  }\n]\n",
    )
    .unwrap();
    fs::write(
        dir.join("splm.toml"),
        format!("package-manager = \"{package_manager}\"\nderivation-engine = \"true\"\n"),
    )
    .unwrap();
}

/// Materialize an installed module layout with a feature-model fragment.
fn install_module(dir: &Path, name: &str, feature: &str, group: &str) -> PathBuf {
    let platform = dir.join("node_modules").join(name).join("src").join("platform");
    fs::create_dir_all(platform.join("code")).unwrap();
    fs::write(
        platform.join(format!("{feature}.uvl")),
        format!("features\n    {group}\n        mandatory\n            {group}.Core\n"),
    )
    .unwrap();
    platform
}

/// Write an executable stub script and return its absolute path.
#[cfg(unix)]
fn stub_script(dir: &Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

#[tokio::test]
async fn add_integrates_a_valid_module() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");
    install_module(dir.path(), "user-management", "user_management_component", "UserManagement");

    workflows::add::run(Some(dir.path()), &["user-management@2.1.0".to_string()])
        .await
        .unwrap();

    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(manifest.contains("\"base_component\": \"*\""));
    assert!(manifest.contains("\"user-management\": \"2.1.0\""));

    let model = fs::read_to_string(dir.path().join("base.uvl")).unwrap();
    assert!(model.contains("    user_management_component\n"));
    assert!(model.contains("            user_management_component.UserManagement\n"));

    let registry = fs::read_to_string(dir.path().join("splModules.json")).unwrap();
    assert!(registry.contains("\"name\": \"user_management_component\""));
    assert!(registry.contains("\"nameProject\": \"user-management\""));
}

#[tokio::test]
async fn add_falls_back_to_the_project_anchor_when_the_main_feature_cannot() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");
    // base_component is flagged as main, but its feature only appears as
    // the qualified leaf base_component.WebApplication; the insertion
    // must anchor on the project's "app" feature instead of failing.
    fs::write(
        dir.path().join("splModules.json"),
        "[\n  {\n    \"name\": \"base_component\",\n    \"nameProject\": \"base_component\",\n    \"main\": true\n  }\n]\n",
    )
    .unwrap();
    install_module(dir.path(), "user-management", "user_management_component", "UserManagement");

    workflows::add::run(Some(dir.path()), &["user-management".to_string()])
        .await
        .unwrap();

    let model = fs::read_to_string(dir.path().join("base.uvl")).unwrap();
    assert!(model.contains("            user_management_component.UserManagement\n"));
}

#[tokio::test]
async fn add_keeps_valid_modules_and_rejects_invalid_ones() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");
    install_module(dir.path(), "good", "good_component", "Good");
    // "bad" has a platform directory but no code subdirectory.
    let platform = dir.path().join("node_modules").join("bad").join("src").join("platform");
    fs::create_dir_all(&platform).unwrap();
    fs::write(platform.join("bad_component.uvl"), "features\n    Bad\n").unwrap();

    workflows::add::run(Some(dir.path()), &["good".to_string(), "bad".to_string()])
        .await
        .unwrap();

    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(manifest.contains("\"good\""));
    assert!(!manifest.contains("\"bad\""));

    let model = fs::read_to_string(dir.path().join("base.uvl")).unwrap();
    assert!(model.contains("good_component.Good"));
    assert!(!model.contains("bad_component"));
}

#[tokio::test]
async fn add_with_no_valid_modules_reverts_the_manifest() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");
    let before = fs::read_to_string(dir.path().join("package.json")).unwrap();

    let err = workflows::add::run(Some(dir.path()), &["ghost".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SplmError>(),
        Some(SplmError::NoValidModules)
    ));

    assert_eq!(fs::read_to_string(dir.path().join("package.json")).unwrap(), before);
}

#[tokio::test]
async fn add_restores_the_manifest_when_installation_fails() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "false");
    let before = fs::read_to_string(dir.path().join("package.json")).unwrap();
    let model_before = fs::read_to_string(dir.path().join("base.uvl")).unwrap();

    let err = workflows::add::run(Some(dir.path()), &["geo-viewer".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SplmError>(),
        Some(SplmError::Installer { .. })
    ));

    assert_eq!(fs::read_to_string(dir.path().join("package.json")).unwrap(), before);
    assert_eq!(fs::read_to_string(dir.path().join("base.uvl")).unwrap(), model_before);
}

#[cfg(unix)]
#[tokio::test]
async fn modify_rolls_back_the_version_on_installer_failure() {
    let dir = TempDir::new().unwrap();
    // Fails only while the manifest declares the bad version, so the
    // rollback's resync (which runs after the file restore) succeeds.
    let pm = stub_script(dir.path(), "pm.sh", "if grep -q 9.9.9 package.json; then exit 1; fi");
    spl_project(dir.path(), &pm);

    let err = workflows::modify::run(Some(dir.path()), "base_component", "9.9.9")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("rolled back"));

    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(manifest.contains("\"base_component\": \"*\""));
    assert!(!manifest.contains("9.9.9"));
}

#[tokio::test]
async fn modify_succeeds_and_records_the_new_version() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");

    workflows::modify::run(Some(dir.path()), "base_component", "2.0.0")
        .await
        .unwrap();

    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(manifest.contains("\"base_component\": \"2.0.0\""));
}

#[tokio::test]
async fn modify_refuses_modules_the_manifest_does_not_declare() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");

    let err = workflows::modify::run(Some(dir.path()), "ghost", "1.0.0")
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SplmError>(),
        Some(SplmError::ModuleNotIntegrated { .. })
    ));
}

#[tokio::test]
async fn remove_cleans_manifest_model_and_registry() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");
    install_module(dir.path(), "user-management", "user_management_component", "UserManagement");
    workflows::add::run(Some(dir.path()), &["user-management".to_string()])
        .await
        .unwrap();

    workflows::remove::run(Some(dir.path()), &["user-management".to_string()])
        .await
        .unwrap();

    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(!manifest.contains("user-management"));

    assert_eq!(fs::read_to_string(dir.path().join("base.uvl")).unwrap(), BASE_MODEL);

    let registry = fs::read_to_string(dir.path().join("splModules.json")).unwrap();
    assert!(!registry.contains("user-management"));
}

#[tokio::test]
async fn remove_uses_the_registry_when_the_module_directory_is_gone() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");
    install_module(dir.path(), "user-management", "user_management_component", "UserManagement");
    workflows::add::run(Some(dir.path()), &["user-management".to_string()])
        .await
        .unwrap();
    fs::remove_dir_all(dir.path().join("node_modules").join("user-management")).unwrap();

    workflows::remove::run(Some(dir.path()), &["user-management".to_string()])
        .await
        .unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("base.uvl")).unwrap(), BASE_MODEL);
}

#[tokio::test]
async fn remove_continues_past_installer_failure_by_default() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "false");

    workflows::remove::run(Some(dir.path()), &["base_component".to_string()])
        .await
        .unwrap();

    // Local cleanup still happened.
    let registry = fs::read_to_string(dir.path().join("splModules.json")).unwrap();
    assert!(!registry.contains("base_component"));
    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(!manifest.contains("base_component"));
}

#[tokio::test]
async fn remove_abort_policy_stops_before_the_registry_step() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "false");
    fs::write(
        dir.path().join("splm.toml"),
        "package-manager = \"false\"\n\n[remove]\non-installer-failure = \"abort\"\n",
    )
    .unwrap();

    let err = workflows::remove::run(Some(dir.path()), &["base_component".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SplmError>(),
        Some(SplmError::Installer { .. })
    ));

    // The registry step never ran.
    let registry = fs::read_to_string(dir.path().join("splModules.json")).unwrap();
    assert!(registry.contains("base_component"));
}

#[tokio::test]
async fn generate_restores_the_manifest_after_the_engine_runs() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");
    fs::write(
        dir.path().join("product.json"),
        "{ \"modules\": { \"base_component\": \"2.0.0\" } }\n",
    )
    .unwrap();
    let before = fs::read_to_string(dir.path().join("package.json")).unwrap();

    let opts = workflows::generate::GenerateOptions {
        product: dir.path().join("product.json"),
        output: PathBuf::from("output"),
        tmp: PathBuf::from("tmp"),
        sync: true,
    };
    workflows::generate::run(Some(dir.path()), &opts).await.unwrap();

    // The temporary version pin was rolled back after the engine call.
    assert_eq!(fs::read_to_string(dir.path().join("package.json")).unwrap(), before);
}

#[tokio::test]
async fn generate_resolves_relative_paths_against_the_project_root() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");
    fs::write(
        dir.path().join("product.json"),
        "{ \"modules\": { \"base_component\": \"2.0.0\" } }\n",
    )
    .unwrap();

    // The test process's cwd is not the project root; the relative
    // product path must still resolve.
    let opts = workflows::generate::GenerateOptions {
        product: PathBuf::from("product.json"),
        output: PathBuf::from("output"),
        tmp: PathBuf::from("tmp"),
        sync: true,
    };
    workflows::generate::run(Some(dir.path()), &opts).await.unwrap();

    // Reconciliation ran and was rolled back, proving the file was read.
    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(manifest.contains("\"base_component\": \"*\""));
}

#[tokio::test]
async fn generate_without_sync_fails_on_version_skew() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");
    fs::write(
        dir.path().join("product.json"),
        "{ \"modules\": { \"base_component\": \"2.0.0\" } }\n",
    )
    .unwrap();

    let opts = workflows::generate::GenerateOptions {
        product: dir.path().join("product.json"),
        output: PathBuf::from("output"),
        tmp: PathBuf::from("tmp"),
        sync: false,
    };
    let err = workflows::generate::run(Some(dir.path()), &opts).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SplmError>(),
        Some(SplmError::Consistency { .. })
    ));
}

#[tokio::test]
async fn concurrent_workflows_fail_fast_on_the_project_lock() {
    let dir = TempDir::new().unwrap();
    spl_project(dir.path(), "true");

    let project = Project::find(Some(dir.path())).unwrap();
    let _held = project.lock().unwrap();

    let err = workflows::modify::run(Some(dir.path()), "base_component", "2.0.0")
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SplmError>(),
        Some(SplmError::ProjectBusy { .. })
    ));
}
