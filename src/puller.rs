//! Pull orchestration
//!
//! Provision → fetch manifest → download workflows → persist categories.
//! Everything runs sequentially. A manifest failure aborts the run; a
//! workflow or category failure is logged, recorded in the [`PullReport`]
//! and the run moves on.

use crate::assets::{
    AssetManifest, CategoryPersister, ManifestFetcher, PersistOutcome, WorkflowDownload,
    WorkflowDownloader,
};
use crate::client::IntegrationClient;
use crate::config::Config;
use crate::error::{ConfigError, DownloadError, FetchError, PersistError, PullError};
use crate::etl::{Extractor, Loader};
use crate::storage::{AssetKind, AssetLayout};
use serde::Serialize;
use std::path::Path;

/// Result of a category persister
pub type CategoryResult = Result<PersistOutcome, PersistError>;

/// Everything a completed run did
#[derive(Debug)]
pub struct PullReport {
    pub downloads: Vec<WorkflowDownload>,
    pub flows: CategoryResult,
    pub listeners: CategoryResult,
    pub messaging: CategoryResult,
}

impl PullReport {
    /// Archives written, in manifest order
    pub fn downloaded(&self) -> impl Iterator<Item = &Path> {
        self.downloads
            .iter()
            .filter_map(|d| d.result.as_ref().ok())
            .map(|p| p.as_path())
    }

    /// Workflows that could not be downloaded
    pub fn failed_workflows(&self) -> impl Iterator<Item = &DownloadError> {
        self.downloads.iter().filter_map(|d| d.result.as_ref().err())
    }

    pub fn categories(&self) -> [(AssetKind, &CategoryResult); 3] {
        [
            (AssetKind::Flows, &self.flows),
            (AssetKind::Listeners, &self.listeners),
            (AssetKind::Messaging, &self.messaging),
        ]
    }

    /// Failed workflows plus failed categories
    pub fn failure_count(&self) -> usize {
        self.failed_workflows().count()
            + self
                .categories()
                .iter()
                .filter(|(_, result)| result.is_err())
                .count()
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Runs pulls for one configured project
pub struct Puller {
    config: Config,
    client: IntegrationClient,
    layout: AssetLayout,
}

impl Puller {
    /// Build the client and output layout for `config`.
    ///
    /// A zero download delay is rejected, downloads are always paced.
    pub fn new(config: Config) -> Result<Self, PullError> {
        if config.download_delay.is_zero() {
            return Err(ConfigError::ZeroDelay.into());
        }
        let client = IntegrationClient::try_new(
            config.base_url.clone(),
            &config.auth,
            config.request_timeout,
        )
        .map_err(PullError::Client)?;
        let layout = AssetLayout::new(&config.output_root);

        Ok(Self {
            config,
            client,
            layout,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &AssetLayout {
        &self.layout
    }

    /// Fetch the project manifest without touching the file system.
    pub async fn fetch_manifest(&self) -> Result<AssetManifest, FetchError> {
        ManifestFetcher::new(self.client.clone(), &self.config.project_name)
            .extract()
            .await
    }

    /// Run a full pull.
    pub async fn run(&self) -> Result<PullReport, PullError> {
        log::info!(
            "Pulling assets of project {} from {}",
            self.config.project_name,
            self.client
        );

        self.layout.provision()?;

        let manifest = self.fetch_manifest().await?;
        Ok(self.export(manifest).await)
    }

    /// Write an already fetched manifest to the output tree.
    ///
    /// The tree must already be provisioned.
    pub async fn export(&self, manifest: AssetManifest) -> PullReport {
        if manifest.is_empty() {
            log::warn!("Project {} has no assets to export", self.config.project_name);
        }
        let AssetManifest {
            workflows,
            flows,
            listeners,
            messaging,
            ..
        } = manifest;

        log::info!("Found {} workflow(s)", workflows.len());
        let downloader = WorkflowDownloader::new(
            self.client.clone(),
            &self.config.project_id,
            self.layout.clone(),
            self.config.download_delay,
        );
        let downloads = downloader.load(workflows).await;

        let flows = save(CategoryPersister::flows(&self.layout), flows).await;
        let listeners = save(CategoryPersister::listeners(&self.layout), listeners).await;
        let messaging = save(CategoryPersister::messaging(&self.layout), messaging).await;

        let report = PullReport {
            downloads,
            flows,
            listeners,
            messaging,
        };

        match report.failure_count() {
            0 => log::info!("Asset pull completed successfully"),
            n => log::warn!("Asset pull completed with {} failure(s)", n),
        }

        report
    }
}

async fn save<T: Serialize + Send>(
    persister: CategoryPersister<T>,
    records: Vec<T>,
) -> CategoryResult {
    let result = persister.load(records).await;
    if let Err(e) = &result {
        log::error!("Error saving {}: {}", persister.kind(), e);
    }
    result
}
