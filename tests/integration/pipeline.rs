//! End-to-end runs of the update pipeline against a mock release server.

use napcat_installer::config::InstallerConfig;
use napcat_installer::core::InstallerError;
use napcat_installer::installer::UpdatePipeline;
use napcat_installer::installer::pipeline::{
    STATUS_FAILED, STATUS_SUCCEEDED, TITLE_FAILED, TITLE_INSTALLING, TITLE_SUCCEEDED,
    TITLE_UPDATING,
};
use napcat_installer::installer::state::PipelineState;
use napcat_installer::test_utils::{
    RecordingDialog, RecordingProgress, framework_zip, init_test_logging,
};
use napcat_installer::utils::progress::Progress;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    PATCH_RENDERER_JS, Sandbox, config_for, mount_asset, mount_latest_release, read,
};

const ASSET_PATH: &str = "/releases/download/v4.8.0/NapCat.Framework.zip";

struct Run {
    pipeline: UpdatePipeline,
    progress: Arc<RecordingProgress>,
    dialog: Arc<RecordingDialog>,
}

fn build(sandbox: &Sandbox, config: InstallerConfig) -> Run {
    init_test_logging(None);
    let progress = Arc::new(RecordingProgress::default());
    let dialog = Arc::new(RecordingDialog::default());
    let paths = sandbox.paths(&config);
    let pipeline = UpdatePipeline::new(config, paths, progress.clone(), dialog.clone()).unwrap();
    Run {
        pipeline,
        progress,
        dialog,
    }
}

#[tokio::test]
async fn test_fresh_install_runs_every_step() {
    let server = MockServer::start().await;
    mount_latest_release(&server, ASSET_PATH).await;
    mount_asset(&server, ASSET_PATH, framework_zip().to_bytes()).await;

    let sandbox = Sandbox::new();
    let mut run = build(&sandbox, config_for(&server));

    let outcome = run.pipeline.run().await.unwrap();

    assert!(!outcome.updated);
    assert_eq!(outcome.disabled_installer, Some(sandbox.disabled_installer_dir()));
    assert_eq!(
        run.pipeline.history(),
        &[
            PipelineState::Idle,
            PipelineState::ResolvingUrl,
            PipelineState::Downloading,
            PipelineState::Extracting,
            PipelineState::Patching,
            PipelineState::Disabling,
            PipelineState::Succeeded,
        ]
    );

    let target = sandbox.install_target();
    assert_eq!(
        read(&target.join("package.json")),
        "{\n  \"name\": \"napcat\",\n  \"version\": \"4.8.0\",\n  \"main\": \"loader.mjs\",\n  \"napcatInstaller\": true\n}"
    );
    assert_eq!(read(&target.join("renderer.js")), format!("// renderer\n{PATCH_RENDERER_JS}"));
    assert!(target.join("lib/napcat.mjs").is_file());

    assert!(!sandbox.installer_dir.exists());
    assert!(sandbox.disabled_installer_dir().join("patch/package.json").is_file());
    assert!(!sandbox.disabled_installer_dir().join("temp.zip").exists());

    assert_eq!(run.progress.titles(), vec![TITLE_INSTALLING, TITLE_SUCCEEDED]);
    assert_eq!(run.progress.last_status().as_deref(), Some(STATUS_SUCCEEDED));
    assert_eq!(run.progress.last_progress(), Some(Progress::DONE));
    assert!(run.dialog.shown().is_empty());
}

#[tokio::test]
async fn test_update_keeps_config_and_replaces_the_rest() {
    let server = MockServer::start().await;
    mount_latest_release(&server, ASSET_PATH).await;
    mount_asset(&server, ASSET_PATH, framework_zip().to_bytes()).await;

    let sandbox = Sandbox::new();
    sandbox.seed_existing_install();
    let mut run = build(&sandbox, config_for(&server));

    let outcome = run.pipeline.run().await.unwrap();

    assert!(outcome.updated);
    assert_eq!(run.pipeline.history()[1], PipelineState::Cleaning);
    let target = sandbox.install_target();
    assert!(!target.join("old-lib").exists());
    assert_eq!(read(&target.join("config/onebot11.json")), r#"{"http":{"port":3000}}"#);
    assert!(read(&target.join("package.json")).contains("\"version\": \"4.8.0\""));
    assert_eq!(run.progress.titles(), vec![TITLE_INSTALLING, TITLE_UPDATING, TITLE_SUCCEEDED]);
}

#[tokio::test]
async fn test_download_failure_stops_before_extraction() {
    let server = MockServer::start().await;
    mount_latest_release(&server, ASSET_PATH).await;
    Mock::given(method("GET"))
        .and(path(ASSET_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = Sandbox::new();
    let mut run = build(&sandbox, config_for(&server));

    let error = run.pipeline.run().await.unwrap_err();

    assert!(matches!(error, InstallerError::Network { .. }));
    let history = run.pipeline.history();
    assert_eq!(history[history.len() - 2], PipelineState::Downloading);
    assert_eq!(history.last(), Some(&PipelineState::Failed(error.to_string())));
    assert!(!history.contains(&PipelineState::Extracting));

    assert!(!sandbox.install_target().exists());
    assert!(sandbox.installer_dir.exists());
    assert!(!sandbox.disabled_installer_dir().exists());

    assert_eq!(run.progress.last_title().as_deref(), Some(TITLE_FAILED));
    assert_eq!(run.progress.last_status().as_deref(), Some(STATUS_FAILED));
    assert_eq!(run.progress.last_progress(), Some(Progress::DONE));

    let shown = run.dialog.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].0, TITLE_FAILED);
    assert!(shown[0].1.contains(&error.to_string()));
}

#[tokio::test]
async fn test_missing_patch_files_fail_after_extraction() {
    let server = MockServer::start().await;
    mount_latest_release(&server, ASSET_PATH).await;
    mount_asset(&server, ASSET_PATH, framework_zip().to_bytes()).await;

    let sandbox = Sandbox::new();
    std::fs::remove_dir_all(sandbox.installer_dir.join("patch")).unwrap();
    let mut run = build(&sandbox, config_for(&server));

    let error = run.pipeline.run().await.unwrap_err();

    assert_eq!(error.kind(), "patch");
    assert!(sandbox.install_target().join("lib/napcat.mjs").is_file());
    assert!(sandbox.installer_dir.exists());
    assert_eq!(run.dialog.shown().len(), 1);
}

#[tokio::test]
async fn test_self_disable_failure_is_a_warning_by_default() {
    let server = MockServer::start().await;
    mount_latest_release(&server, ASSET_PATH).await;
    mount_asset(&server, ASSET_PATH, framework_zip().to_bytes()).await;

    let sandbox = Sandbox::new();
    std::fs::create_dir_all(sandbox.disabled_installer_dir().join("occupied")).unwrap();
    let mut run = build(&sandbox, config_for(&server));

    let outcome = run.pipeline.run().await.unwrap();

    assert_eq!(outcome.disabled_installer, None);
    assert_eq!(run.pipeline.state(), &PipelineState::Succeeded);
    assert_eq!(run.progress.last_title().as_deref(), Some(TITLE_SUCCEEDED));
    let status = run.progress.last_status().unwrap();
    assert!(status.starts_with(STATUS_SUCCEEDED));
    assert!(status.contains("napcat-installer"));
    assert!(run.dialog.shown().is_empty());
}

#[tokio::test]
async fn test_self_disable_failure_can_be_fatal() {
    let server = MockServer::start().await;
    mount_latest_release(&server, ASSET_PATH).await;
    mount_asset(&server, ASSET_PATH, framework_zip().to_bytes()).await;

    let sandbox = Sandbox::new();
    std::fs::create_dir_all(sandbox.disabled_installer_dir().join("occupied")).unwrap();
    let config = InstallerConfig {
        self_disable_failure_is_fatal: true,
        ..config_for(&server)
    };
    let mut run = build(&sandbox, config);

    let error = run.pipeline.run().await.unwrap_err();

    assert_eq!(error.kind(), "io");
    assert!(matches!(run.pipeline.state(), PipelineState::Failed(_)));
    assert_eq!(run.progress.last_title().as_deref(), Some(TITLE_FAILED));
    assert_eq!(run.dialog.shown().len(), 1);
}
