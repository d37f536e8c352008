//! The `napcat-installer` binary end to end.

use assert_cmd::Command;
use napcat_installer::config::{
    CONFIG_PATH_ENV, GITHUB_TOKEN_ENV, INSTALLER_DIR_ENV, PLUGINS_ROOT_ENV,
};
use napcat_installer::test_utils::framework_zip;
use napcat_installer::utils::progress::NO_PROGRESS_ENV;
use predicates::prelude::*;
use wiremock::MockServer;

use crate::common::{Sandbox, mount_asset, mount_latest_release};

const ASSET_PATH: &str = "/download/NapCat.Framework.zip";

fn installer(sandbox: &Sandbox) -> Command {
    let mut cmd = Command::cargo_bin("napcat-installer").unwrap();
    cmd.env_remove(PLUGINS_ROOT_ENV)
        .env_remove(INSTALLER_DIR_ENV)
        .env_remove(CONFIG_PATH_ENV)
        .env_remove(GITHUB_TOKEN_ENV)
        .env(NO_PROGRESS_ENV, "1")
        .arg("--installer-dir")
        .arg(&sandbox.installer_dir)
        .arg("--no-wait");
    cmd
}

fn write_settings(sandbox: &Sandbox, server: &MockServer) {
    std::fs::write(
        sandbox.installer_dir.join("installer.toml"),
        format!("api_base_url = \"{}\"\n", server.uri()),
    )
    .unwrap();
}

#[test]
fn test_help_lists_flags() {
    Command::cargo_bin("napcat-installer")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--plugins-root"))
        .stdout(predicate::str::contains("--no-progress"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    Command::cargo_bin("napcat-installer")
        .unwrap()
        .args(["--verbose", "--quiet"])
        .assert()
        .failure();
}

#[test]
fn test_missing_explicit_config_exits_with_error() {
    let sandbox = Sandbox::new();

    installer(&sandbox)
        .arg("--config")
        .arg(sandbox.installer_dir.join("absent.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load installer configuration"));

    assert!(sandbox.installer_dir.exists());
}

#[test]
fn test_invalid_config_value_is_reported() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.installer_dir.join("installer.toml"), "framework_dir_name = \"../x\"\n")
        .unwrap();

    installer(&sandbox)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("framework_dir_name"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_install_from_mock_release() {
    let server = MockServer::start().await;
    mount_latest_release(&server, ASSET_PATH).await;
    mount_asset(&server, ASSET_PATH, framework_zip().to_bytes()).await;

    let sandbox = Sandbox::new();
    write_settings(&sandbox, &server);

    installer(&sandbox)
        .assert()
        .success()
        .stderr(predicate::str::contains("NapCat is installed in"));

    assert!(sandbox.install_target().join("package.json").is_file());
    assert!(sandbox.disabled_installer_dir().join("installer.toml").is_file());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_install_shows_report_and_exits_1() {
    let server = MockServer::start().await;

    let sandbox = Sandbox::new();
    write_settings(&sandbox, &server);

    installer(&sandbox)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("NapCat installation failed"))
        .stderr(predicate::str::contains("fetching release metadata"));

    assert!(sandbox.installer_dir.exists());
}
