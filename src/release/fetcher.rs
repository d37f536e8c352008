//! GitHub release lookup and asset download.
//!
//! [`ReleaseFetcher`] performs the two network steps of an update:
//!
//! 1. [`resolve_latest`](ReleaseFetcher::resolve_latest) reads the latest
//!    release document of a repository and selects one asset by file name.
//! 2. [`download`](ReleaseFetcher::download) streams that asset to disk,
//!    reporting progress per received chunk.
//!
//! Automatic redirects are disabled on the underlying client. Every request
//! follows at most one redirect by hand: release downloads are served by a
//! single hop from `github.com` to the object store, and anything longer is
//! treated as a failure. There are no timeouts and no retries.

use reqwest::header::{ACCEPT, AUTHORIZATION, LOCATION};
use reqwest::{Client, RequestBuilder, Response, Url, redirect};
use serde::Deserialize;
use std::error::Error as _;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::InstallerConfig;
use crate::core::{InstallerError, Result};
use crate::utils::progress::Progress;

/// `Accept` header value for the GitHub REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// One downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    /// File name of the asset (e.g. `NapCat.Framework.zip`).
    pub name: String,
    /// Public download URL.
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    /// Declared size in bytes, if published.
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ReleaseDocument {
    #[serde(default)]
    tag_name: Option<String>,
    assets: Vec<ReleaseAsset>,
}

/// HTTP client for release metadata and asset downloads.
#[derive(Debug, Clone)]
pub struct ReleaseFetcher {
    client: Client,
    api_base_url: String,
    token: Option<String>,
}

impl ReleaseFetcher {
    /// Create a fetcher from the installer configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Network`] if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(config: &InstallerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| network_error("creating the HTTP client", &config.api_base_url, &e))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
        })
    }

    /// URL of the "latest release" endpoint for a repository.
    #[must_use]
    pub fn latest_release_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{owner}/{repo}/releases/latest", self.api_base_url)
    }

    /// Find the asset named `asset_name` in the latest release of `owner/repo`.
    ///
    /// # Errors
    ///
    /// - [`InstallerError::Network`] on transport failure or a non-success status
    /// - [`InstallerError::AssetNotFound`] when the body is not a release
    ///   document or no asset carries the expected name
    pub async fn resolve_latest(
        &self,
        owner: &str,
        repo: &str,
        asset_name: &str,
    ) -> Result<ReleaseAsset> {
        let url = self.latest_release_url(owner, repo);
        let operation = "fetching release metadata";
        debug!("Fetching latest release from {url}");

        let response = self
            .send_following_once(&url, operation, |request| {
                let request = request.header(ACCEPT, GITHUB_ACCEPT);
                match &self.token {
                    Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
                    None => request,
                }
            })
            .await?;
        let response = ensure_success(response, operation, &url)?;

        let repository = format!("{owner}/{repo}");
        let document = response.json::<ReleaseDocument>().await.map_err(|e| {
            if e.is_decode() {
                InstallerError::AssetNotFound {
                    asset: asset_name.to_string(),
                    repository: repository.clone(),
                    reason: format!("release metadata could not be parsed: {}", describe(&e)),
                }
            } else {
                network_error(operation, &url, &e)
            }
        })?;

        if let Some(tag) = &document.tag_name {
            info!("Latest release of {repository} is {tag}");
        }

        select_asset(document.assets, asset_name).ok_or_else(|| InstallerError::AssetNotFound {
            asset: asset_name.to_string(),
            repository,
            reason: format!(
                "the latest release{} has no asset with that name",
                document.tag_name.map(|tag| format!(" ({tag})")).unwrap_or_default()
            ),
        })
    }

    /// Download `url` into `dest`, reporting progress to `on_progress`.
    ///
    /// Any existing file at `dest` is removed first and the parent directory
    /// is created if needed. Progress is `Ratio(received / content-length)`,
    /// or [`Progress::Indeterminate`] throughout when the server does not
    /// declare a length; it never decreases and ends at `Ratio(1.0)`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`InstallerError::Io`] if `dest` cannot be prepared or written
    /// - [`InstallerError::Network`] on transport failure, a non-success
    ///   status or a second redirect. A partially written file is left behind.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<u64> {
        let operation = "downloading release asset";
        prepare_destination(dest).await?;

        let response = self.send_following_once(url, operation, |request| request).await?;
        let mut response = ensure_success(response, operation, url)?;

        let total = response.content_length().filter(|&length| length > 0);
        debug!("Downloading {url} ({} bytes)", total.map_or("unknown".to_string(), |t| t.to_string()));

        let mut file = fs::File::create(dest)
            .await
            .map_err(|e| InstallerError::io("create file", dest, e))?;

        on_progress(match total {
            Some(_) => Progress::Ratio(0.0),
            None => Progress::Indeterminate,
        });

        let mut downloaded: u64 = 0;
        while let Some(chunk) =
            response.chunk().await.map_err(|e| network_error(operation, url, &e))?
        {
            file.write_all(&chunk).await.map_err(|e| InstallerError::io("write", dest, e))?;
            downloaded += chunk.len() as u64;
            if let Some(total) = total {
                on_progress(Progress::from_bytes(downloaded, total));
            }
        }

        file.flush().await.map_err(|e| InstallerError::io("flush", dest, e))?;
        drop(file);

        on_progress(Progress::DONE);
        info!("Downloaded {downloaded} bytes to {}", dest.display());
        Ok(downloaded)
    }

    /// Send a GET request and follow a single redirect if the server answers
    /// with one. A second redirect fails with [`InstallerError::Network`].
    async fn send_following_once(
        &self,
        url: &str,
        operation: &str,
        decorate: impl Fn(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response> {
        let response = decorate(self.client.get(url))
            .send()
            .await
            .map_err(|e| network_error(operation, url, &e))?;

        let Some(target) = redirect_target(&response, operation, url)? else {
            return Ok(response);
        };

        debug!("Following redirect from {url} to {target}");
        let response = decorate(self.client.get(target.clone()))
            .send()
            .await
            .map_err(|e| network_error(operation, target.as_str(), &e))?;

        if response.status().is_redirection() {
            return Err(InstallerError::Network {
                operation: operation.to_string(),
                url: target.to_string(),
                reason: format!(
                    "redirect limit reached (HTTP {} after one redirect)",
                    response.status()
                ),
            });
        }

        Ok(response)
    }
}

/// Pick the asset whose name equals `asset_name`.
#[must_use]
pub fn select_asset(assets: Vec<ReleaseAsset>, asset_name: &str) -> Option<ReleaseAsset> {
    assets.into_iter().find(|asset| asset.name == asset_name)
}

fn redirect_target(response: &Response, operation: &str, url: &str) -> Result<Option<Url>> {
    if !response.status().is_redirection() {
        return Ok(None);
    }

    let Some(location) = response.headers().get(LOCATION) else {
        return Ok(None);
    };

    let location = location.to_str().map_err(|e| InstallerError::Network {
        operation: operation.to_string(),
        url: url.to_string(),
        reason: format!("invalid Location header: {e}"),
    })?;

    response.url().join(location).map(Some).map_err(|e| InstallerError::Network {
        operation: operation.to_string(),
        url: url.to_string(),
        reason: format!("invalid redirect target '{location}': {e}"),
    })
}

fn ensure_success(response: Response, operation: &str, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(InstallerError::Network {
        operation: operation.to_string(),
        url: url.to_string(),
        reason: format!("HTTP {status}"),
    })
}

async fn prepare_destination(dest: &Path) -> Result<()> {
    match fs::remove_file(dest).await {
        Ok(()) => debug!("Removed stale {}", dest.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(InstallerError::io("remove file", dest, e)),
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| InstallerError::io("create directory", parent, e))?;
    }

    Ok(())
}

fn network_error(operation: &str, url: &str, error: &reqwest::Error) -> InstallerError {
    InstallerError::Network {
        operation: operation.to_string(),
        url: url.to_string(),
        reason: describe(error),
    }
}

/// reqwest only displays its own message ("error sending request for url"),
/// the actual cause (refused connection, DNS, TLS, bad JSON) is in the source chain.
fn describe(error: &reqwest::Error) -> String {
    let mut rendered = error.to_string();
    let mut cause = error.source();
    while let Some(inner) = cause {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        cause = inner.source();
    }
    rendered
}
