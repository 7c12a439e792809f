//! webMethods.io Integration project assets
//!
//! The manifest model plus the extractor and loaders that move it to disk:
//! - [`ManifestFetcher`] lists every asset of a project
//! - [`WorkflowDownloader`] exports each workflow as a `.zip` archive
//! - [`CategoryPersister`] saves flows, listeners and messaging as JSON lists

mod downloader;
mod fetcher;
mod manifest;
mod persister;

pub use downloader::{WorkflowDownload, WorkflowDownloader};
pub use fetcher::ManifestFetcher;
pub use manifest::{AssetManifest, AssetRecord, ListenerRecord, ListenerState};
pub use persister::{CategoryPersister, PersistOutcome};
