//! Getting the framework archive onto disk.
//!
//! - [`fetcher`]: latest-release lookup and streaming download over HTTP
//! - [`archive`]: zip extraction with progress reporting

pub mod archive;
pub mod fetcher;

pub use archive::ArchiveExtractor;
pub use fetcher::{GITHUB_ACCEPT, ReleaseAsset, ReleaseFetcher, select_asset};
