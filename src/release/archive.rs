//! Zip extraction with byte-level progress.
//!
//! Progress is measured on the compressed side: a counting reader sits
//! between the archive file and the zip decoder, so the ratio is "bytes read
//! from the archive / archive size". The decoder also reads the central
//! directory, so the counter can exceed the file size; reported values are
//! clamped and never go backwards.

use std::cell::Cell;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::core::{InstallerError, Result};
use crate::utils::progress::Progress;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Unpacks a downloaded release archive into the install target.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    /// Create an extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Extract every entry of `archive` into `dest` and delete the archive.
    ///
    /// `dest` is created if needed. Entries whose names would escape `dest`
    /// are rejected. On success the archive is removed and `Ratio(1.0)` is
    /// reported. The zip decoding runs on tokio's blocking pool; this future
    /// completes only once all of it is done.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Extract`] for a malformed archive or any
    /// I/O failure while unpacking; the archive is left in place.
    pub async fn extract<F>(&self, archive: &Path, dest: &Path, on_progress: F) -> Result<()>
    where
        F: FnMut(Progress) + Send + 'static,
    {
        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();
        let task_archive = archive.clone();

        tokio::task::spawn_blocking(move || extract_blocking(&task_archive, &dest, on_progress))
            .await
            .map_err(|e| InstallerError::Extract {
                archive,
                reason: format!("extraction task failed: {e}"),
            })?
    }
}

fn extract_blocking<F>(archive_path: &Path, dest: &Path, mut on_progress: F) -> Result<()>
where
    F: FnMut(Progress),
{
    let fail = |reason: String| InstallerError::Extract {
        archive: archive_path.to_path_buf(),
        reason,
    };

    let file = File::open(archive_path).map_err(|e| fail(format!("cannot open archive: {e}")))?;
    let total = file.metadata().map_err(|e| fail(format!("cannot stat archive: {e}")))?.len();

    let counter = Rc::new(Cell::new(0_u64));
    let reader = BufReader::new(CountingReader::new(file, Rc::clone(&counter)));
    let mut archive = ZipArchive::new(reader).map_err(|e| fail(format!("invalid zip archive: {e}")))?;

    fs::create_dir_all(dest).map_err(|e| fail(format!("cannot create {}: {e}", dest.display())))?;

    let mut reporter = MonotonicProgress::new(total);
    on_progress(reporter.update(counter.get()));

    debug!("Extracting {} entries from {}", archive.len(), archive_path.display());
    let mut buffer = vec![0_u8; COPY_BUFFER_SIZE];

    for index in 0..archive.len() {
        let mut entry =
            archive.by_index(index).map_err(|e| fail(format!("cannot read entry #{index}: {e}")))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(fail(format!("entry '{}' escapes the target directory", entry.name())));
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|e| fail(format!("cannot create {}: {e}", out_path.display())))?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| fail(format!("cannot create {}: {e}", parent.display())))?;
            }

            let mut out = File::create(&out_path)
                .map_err(|e| fail(format!("cannot create {}: {e}", out_path.display())))?;

            loop {
                let read = entry
                    .read(&mut buffer)
                    .map_err(|e| fail(format!("cannot read {}: {e}", entry.name())))?;
                if read == 0 {
                    break;
                }
                out.write_all(&buffer[..read])
                    .map_err(|e| fail(format!("cannot write {}: {e}", out_path.display())))?;
                on_progress(reporter.update(counter.get()));
            }
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode)).map_err(|e| {
                    fail(format!("cannot set permissions on {}: {e}", out_path.display()))
                })?;
            }
        }

        on_progress(reporter.update(counter.get()));
    }

    drop(archive);
    fs::remove_file(archive_path).map_err(|e| fail(format!("cannot remove archive: {e}")))?;

    on_progress(Progress::DONE);
    info!("Extracted {} into {}", archive_path.display(), dest.display());
    Ok(())
}

/// Turns a growing byte counter into clamped, non-decreasing progress.
struct MonotonicProgress {
    total: u64,
    last: f64,
}

impl MonotonicProgress {
    const fn new(total: u64) -> Self {
        Self {
            total,
            last: 0.0,
        }
    }

    fn update(&mut self, processed: u64) -> Progress {
        match Progress::from_bytes(processed, self.total) {
            Progress::Ratio(ratio) => {
                self.last = self.last.max(ratio);
                Progress::Ratio(self.last)
            }
            Progress::Indeterminate => Progress::Indeterminate,
        }
    }
}

/// Reader adapter counting every byte pulled from the inner reader.
struct CountingReader<R> {
    inner: R,
    count: Rc<Cell<u64>>,
}

impl<R> CountingReader<R> {
    const fn new(inner: R, count: Rc<Cell<u64>>) -> Self {
        Self {
            inner,
            count,
        }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.count.set(self.count.get() + read as u64);
        Ok(read)
    }
}

impl<R: Seek> Seek for CountingReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
