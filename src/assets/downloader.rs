//! Workflow archive downloader
//!
//! Each workflow is exported in two steps:
//! 1. `POST /apis/v1/rest/projects/{project_id}/workflows/{id}/export`
//!    answers with `{"output": {"download_link": "..."}}`
//! 2. `GET {download_link}` without credentials returns the archive
//!
//! The archive lands in `workflows/{id}.zip`. The name always comes from the
//! workflow ID, never from the link.

use crate::client::IntegrationClient;
use crate::error::DownloadError;
use crate::etl::Loader;
use crate::storage::{AssetLayout, write_atomic};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Outcome of one workflow download
#[derive(Debug)]
pub struct WorkflowDownload {
    pub id: String,
    pub result: Result<PathBuf, DownloadError>,
}

impl WorkflowDownload {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Loader that turns workflow IDs into archives on disk
///
/// IDs are processed one at a time, in order, with `delay` between two
/// successive exports to keep the load on the tenant low. A failure is
/// logged and recorded for that ID only.
pub struct WorkflowDownloader {
    client: IntegrationClient,
    project_id: String,
    layout: AssetLayout,
    delay: Duration,
}

impl WorkflowDownloader {
    pub fn new(
        client: IntegrationClient,
        project_id: impl Into<String>,
        layout: AssetLayout,
        delay: Duration,
    ) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            layout,
            delay,
        }
    }

    /// Download one workflow archive and return where it was written.
    pub async fn download(&self, workflow_id: &str) -> Result<PathBuf, DownloadError> {
        let id = || workflow_id.to_string();

        let path = self
            .layout
            .workflow_archive(workflow_id)
            .ok_or_else(|| DownloadError::InvalidId { id: id() })?;

        log::info!("Getting download link for workflow {}", workflow_id);
        let link = self.export_link(workflow_id).await?;

        log::info!("Downloading workflow {}", workflow_id);
        let response = self
            .client
            .fetch_link(link)
            .await
            .map_err(|source| DownloadError::Fetch { id: id(), source })?;

        if !response.status().is_success() {
            return Err(DownloadError::FetchStatus {
                id: id(),
                status: response.status(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| DownloadError::Fetch { id: id(), source })?;

        write_atomic(&path, &bytes).map_err(|source| DownloadError::Write {
            id: id(),
            path: path.clone(),
            source,
        })?;

        log::info!(
            "Workflow {} saved to {} ({} bytes)",
            workflow_id,
            path.display(),
            bytes.len()
        );
        Ok(path)
    }

    /// Step 1: ask the tenant for a short-lived download link.
    async fn export_link(&self, workflow_id: &str) -> Result<Url, DownloadError> {
        let id = || workflow_id.to_string();

        let response = self
            .client
            .request_export(&self.project_id, workflow_id)
            .await
            .map_err(|source| DownloadError::ExportRequest { id: id(), source })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DownloadError::ExportStatus {
                id: id(),
                status,
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|source| DownloadError::ExportDecode { id: id(), source })?;

        let link = body
            .pointer("/output/download_link")
            .and_then(Value::as_str)
            .filter(|link| !link.is_empty())
            .ok_or_else(|| DownloadError::MissingLink { id: id() })?;

        Url::parse(link).map_err(|source| DownloadError::InvalidLink {
            id: id(),
            link: link.to_string(),
            source,
        })
    }

    /// Download every ID in order, pausing between successive exports.
    pub async fn download_all(&self, workflow_ids: &[String]) -> Vec<WorkflowDownload> {
        let mut downloads = Vec::with_capacity(workflow_ids.len());

        for (index, workflow_id) in workflow_ids.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.delay).await;
            }

            let result = self.download(workflow_id).await;
            if let Err(e) = &result {
                log::error!("Error downloading workflow {}: {}", workflow_id, e);
            }
            downloads.push(WorkflowDownload {
                id: workflow_id.clone(),
                result,
            });
        }

        let saved = downloads.iter().filter(|d| d.is_ok()).count();
        log::info!(
            "Downloaded {} of {} workflow(s)",
            saved,
            workflow_ids.len()
        );

        downloads
    }
}

impl Loader for WorkflowDownloader {
    type Item = String;
    type Output = Vec<WorkflowDownload>;

    async fn load(&self, items: Vec<Self::Item>) -> Self::Output {
        self.download_all(&items).await
    }
}
