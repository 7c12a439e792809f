//! webMethods.io Integration Asset Puller
//!
//! Exports the workflows, flows, listeners and messaging assets of an
//! integration project into a local directory tree for version control.

pub mod assets;
pub mod client;
pub mod config;
pub mod error;
pub mod etl;
pub mod logging;
pub mod puller;
pub mod storage;

// Re-exports for convenience
pub use assets::{AssetManifest, CategoryPersister, ManifestFetcher, WorkflowDownloader};
pub use client::{Auth, IntegrationClient};
pub use config::Config;
pub use error::{ConfigError, DownloadError, FetchError, PersistError, PullError};
pub use etl::{Extractor, Loader};
pub use puller::{PullReport, Puller};
pub use storage::{AssetKind, AssetLayout};
