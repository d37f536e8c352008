//! On-disk and in-memory fixtures: release archives and patch directories.

use std::io::{Cursor, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Builder for zip archives used as fake release assets.
#[derive(Debug, Default, Clone)]
pub struct ZipFixture {
    entries: Vec<(String, Option<Vec<u8>>)>,
}

impl ZipFixture {
    /// Start an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file entry.
    pub fn file(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries.push((name.to_string(), Some(content.as_ref().to_vec())));
        self
    }

    /// Add an explicit directory entry.
    pub fn dir(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), None));
        self
    }

    /// Encode the archive.
    ///
    /// # Panics
    ///
    /// Panics if the zip writer rejects an entry.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in &self.entries {
            match content {
                Some(content) => {
                    zip.start_file(name.as_str(), options).expect("start zip entry");
                    zip.write_all(content).expect("write zip entry");
                }
                None => zip.add_directory(name.as_str(), options).expect("add zip directory"),
            }
        }
        zip.finish().expect("finish zip").into_inner()
    }

    /// Write the archive to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).expect("write zip fixture");
    }
}

/// A small framework archive with the two files the patcher touches.
pub fn framework_zip() -> ZipFixture {
    ZipFixture::new()
        .file("package.json", r#"{"name":"napcat","version":"4.8.0","main":"napcat.mjs"}"#)
        .file("renderer.js", "// renderer\n")
        .dir("lib/")
        .file("lib/napcat.mjs", "export default {};\n")
}

/// Create `<installer_dir>/patch` with the given overrides.
///
/// # Panics
///
/// Panics if the files cannot be written.
pub fn write_patch_dir(installer_dir: &Path, package_json: &str, renderer_js: &str) {
    let patch = installer_dir.join("patch");
    std::fs::create_dir_all(&patch).expect("create patch dir");
    std::fs::write(patch.join("package.json"), package_json).expect("write package.json");
    std::fs::write(patch.join("renderer.js"), renderer_js).expect("write renderer.js");
}
