//! Common test utilities for the installer integration tests
//!
//! A [`Sandbox`] is a throwaway plugins root with an installer directory in
//! it; [`mount_latest_release`] makes a wiremock server answer like the
//! GitHub "latest release" endpoint.

// Not every helper is used by every test module
#![allow(dead_code)]

use napcat_installer::config::{InstallPaths, InstallerConfig};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LATEST_PATH: &str = "/repos/NapNeko/NapCatQQ/releases/latest";
pub const ASSET_NAME: &str = "NapCat.Framework.zip";

pub const PATCH_PACKAGE_JSON: &str = r#"{"main":"loader.mjs","napcatInstaller":true}"#;
pub const PATCH_RENDERER_JS: &str = "// napcat loader\n";

/// Plugins root with an installer directory and its patch files.
pub struct Sandbox {
    _temp: TempDir,
    pub plugins_root: PathBuf,
    pub installer_dir: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let plugins_root = temp.path().join("plugins");
        let installer_dir = plugins_root.join("napcat-installer");
        std::fs::create_dir_all(&installer_dir).unwrap();
        napcat_installer::test_utils::write_patch_dir(
            &installer_dir,
            PATCH_PACKAGE_JSON,
            PATCH_RENDERER_JS,
        );

        Self {
            _temp: temp,
            plugins_root,
            installer_dir,
        }
    }

    pub fn install_target(&self) -> PathBuf {
        self.plugins_root.join("napcat")
    }

    pub fn disabled_installer_dir(&self) -> PathBuf {
        self.plugins_root.join(".napcat-installer")
    }

    pub fn paths(&self, config: &InstallerConfig) -> InstallPaths {
        InstallPaths::new(&self.plugins_root, &self.installer_dir, config)
    }

    /// Put an older installation with user config in place.
    pub fn seed_existing_install(&self) {
        let target = self.install_target();
        std::fs::create_dir_all(target.join("config")).unwrap();
        std::fs::write(target.join("config/onebot11.json"), r#"{"http":{"port":3000}}"#).unwrap();
        std::fs::create_dir_all(target.join("old-lib")).unwrap();
        std::fs::write(target.join("old-lib/stale.js"), "stale").unwrap();
        std::fs::write(target.join("package.json"), r#"{"version":"1.0.0"}"#).unwrap();
    }
}

/// Installer settings pointing the API at a mock server.
pub fn config_for(server: &MockServer) -> InstallerConfig {
    InstallerConfig {
        api_base_url: server.uri(),
        ..InstallerConfig::default()
    }
}

/// A release document in the GitHub API shape.
pub fn release_json(tag: &str, assets: &[(&str, String)]) -> Value {
    let assets: Vec<Value> = assets
        .iter()
        .map(|(name, url)| {
            json!({
                "name": name,
                "browser_download_url": url,
                "size": 1024,
                "content_type": "application/zip",
            })
        })
        .collect();

    json!({
        "tag_name": tag,
        "name": tag,
        "draft": false,
        "prerelease": false,
        "assets": assets,
    })
}

/// Answer the latest-release endpoint with a release containing the
/// framework asset served from `asset_path` on the same server.
pub async fn mount_latest_release(server: &MockServer, asset_path: &str) {
    let body = release_json(
        "v4.8.0",
        &[
            ("NapCat.Shell.zip", format!("{}/other/shell.zip", server.uri())),
            (ASSET_NAME, format!("{}{asset_path}", server.uri())),
        ],
    );

    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve `bytes` at `asset_path`.
pub async fn mount_asset(server: &MockServer, asset_path: &str, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(asset_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/zip")
                .set_body_bytes(bytes),
        )
        .mount(server)
        .await;
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}
