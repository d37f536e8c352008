//! Post-extraction patching of the framework.
//!
//! Two files of a fresh installation are adjusted from overrides shipped in
//! the installer's patch directory:
//!
//! - `package.json` is merged key by key with the override document
//!   ([`ConfigDocument::merge`]): the override wins, key order is kept.
//! - `renderer.js` gets the override script appended verbatim
//!   ([`append_script`]).
//!
//! There is no rollback: a failure after `package.json` was rewritten leaves
//! it rewritten.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::core::{InstallerError, Result};
use crate::utils::progress::Progress;

/// Manifest file merged with its override.
pub const PACKAGE_JSON: &str = "package.json";

/// Script file extended with the override.
pub const RENDERER_JS: &str = "renderer.js";

/// An ordered JSON object.
///
/// Keys keep their document order through parsing, merging and
/// serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument(Map<String, Value>);

impl ConfigDocument {
    /// Parse a JSON document whose top level must be an object.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the text is not JSON or the
    /// top level is not an object.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
            Err(e) => Err(format!("invalid JSON: {e}")),
        }
    }

    /// Shallow merge with `overrides` taking precedence.
    ///
    /// A key present in both keeps its position from `self` and takes the
    /// value from `overrides`. Keys only in `overrides` are appended in their
    /// order. Nested objects are replaced, not merged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use napcat_installer::installer::patch::ConfigDocument;
    ///
    /// let base = ConfigDocument::parse(r#"{"a":1,"b":2}"#).unwrap();
    /// let patch = ConfigDocument::parse(r#"{"b":3,"c":4}"#).unwrap();
    /// assert_eq!(base.merge(patch).to_compact_string().unwrap(), r#"{"a":1,"b":3,"c":4}"#);
    /// ```
    #[must_use]
    pub fn merge(mut self, overrides: Self) -> Self {
        for (key, value) in overrides.0 {
            self.0.insert(key, value);
        }
        self
    }

    /// Serialize with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns the serializer error unchanged.
    pub fn to_pretty_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }

    /// Serialize without whitespace.
    ///
    /// # Errors
    ///
    /// Returns the serializer error unchanged.
    pub fn to_compact_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Append `addition` to `base` with no separator.
///
/// Works on raw bytes: scripts are not required to be UTF-8.
#[must_use]
pub fn append_script(base: &[u8], addition: &[u8]) -> Vec<u8> {
    let mut script = Vec::with_capacity(base.len() + addition.len());
    script.extend_from_slice(base);
    script.extend_from_slice(addition);
    script
}

/// Applies the installer's patch files to an installation.
#[derive(Debug, Clone)]
pub struct Patcher {
    patch_dir: PathBuf,
}

impl Patcher {
    /// Create a patcher reading overrides from `patch_dir`.
    pub fn new(patch_dir: impl Into<PathBuf>) -> Self {
        Self {
            patch_dir: patch_dir.into(),
        }
    }

    /// Patch `install_dir`: merge `package.json`, then append `renderer.js`.
    ///
    /// Reports `Ratio(0.5)` after the manifest and `Ratio(1.0)` after the
    /// script.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Patch`] naming the file that could not be
    /// read, parsed or written.
    pub async fn apply(&self, install_dir: &Path, mut on_progress: impl FnMut(Progress)) -> Result<()> {
        let base_path = install_dir.join(PACKAGE_JSON);
        let override_path = self.patch_dir.join(PACKAGE_JSON);

        let base = ConfigDocument::parse(&read_text(&base_path).await?)
            .map_err(|reason| patch_error(&base_path, reason))?;
        let overrides = ConfigDocument::parse(&read_text(&override_path).await?)
            .map_err(|reason| patch_error(&override_path, reason))?;
        debug!("Merging {} override keys into {}", overrides.0.len(), base_path.display());

        let merged = base
            .merge(overrides)
            .to_pretty_string()
            .map_err(|e| patch_error(&base_path, format!("cannot serialize: {e}")))?;
        write_file(&base_path, merged.as_bytes()).await?;
        on_progress(Progress::Ratio(0.5));

        let script_path = install_dir.join(RENDERER_JS);
        let addition_path = self.patch_dir.join(RENDERER_JS);
        let script = read_bytes(&script_path).await?;
        let addition = read_bytes(&addition_path).await?;

        write_file(&script_path, &append_script(&script, &addition)).await?;
        on_progress(Progress::DONE);

        info!("Patched {}", install_dir.display());
        Ok(())
    }
}

async fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).await.map_err(|e| patch_error(path, format!("cannot read: {e}")))
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).await.map_err(|e| patch_error(path, format!("cannot read: {e}")))
}

async fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content).await.map_err(|e| patch_error(path, format!("cannot write: {e}")))
}

fn patch_error(path: &Path, reason: impl Into<String>) -> InstallerError {
    InstallerError::Patch {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
