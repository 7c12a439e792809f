//! Error taxonomy for an asset pull.
//!
//! Configuration and manifest failures are fatal for the whole run and end up
//! in [`PullError`]. Download and persist failures are scoped to one workflow
//! or one category; the orchestrator records them and keeps going.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "missing required setting `{key}`: set the {env} environment variable or add `{key}` to the config file"
    )]
    Missing { key: &'static str, env: &'static str },

    #[error("config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("invalid base URL `{value}`: {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("invalid value `{value}` for {env}: expected a non-negative integer")]
    InvalidNumber { env: &'static str, value: String },

    #[error("download delay must be at least 1 ms, workflow downloads are always paced")]
    ZeroDelay,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: Url,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {url} has no `output` field")]
    MissingOutput { url: Url },

    #[error("`output` from {url} is not a valid asset manifest: {source}")]
    Malformed {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("workflow ID `{id}` cannot be used as a file name")]
    InvalidId { id: String },

    #[error("export request for workflow {id} failed: {source}")]
    ExportRequest {
        id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("export request for workflow {id} returned {status}: {body}")]
    ExportStatus {
        id: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode export response for workflow {id}: {source}")]
    ExportDecode {
        id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("export response for workflow {id} has no `output.download_link`")]
    MissingLink { id: String },

    #[error("download link for workflow {id} is not a valid URL `{link}`: {source}")]
    InvalidLink {
        id: String,
        link: String,
        #[source]
        source: url::ParseError,
    },

    #[error("fetching archive for workflow {id} failed: {source}")]
    Fetch {
        id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching archive for workflow {id} returned {status}")]
    FetchStatus { id: String, status: StatusCode },

    #[error("writing archive for workflow {id} to {} failed: {source}", path.display())]
    Write {
        id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// The workflow this failure belongs to.
    pub fn workflow_id(&self) -> &str {
        match self {
            Self::InvalidId { id }
            | Self::ExportRequest { id, .. }
            | Self::ExportDecode { id, .. }
            | Self::ExportStatus { id, .. }
            | Self::MissingLink { id }
            | Self::InvalidLink { id, .. }
            | Self::Fetch { id, .. }
            | Self::FetchStatus { id, .. }
            | Self::Write { id, .. } => id,
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to serialize {category} list: {source}")]
    Serialize {
        category: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {category} list to {}: {source}", path.display())]
    Write {
        category: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures that abort a run.
#[derive(Debug, Error)]
pub enum PullError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create output directory {}: {source}", path.display())]
    Provision {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to retrieve asset manifest: {0}")]
    Fetch(#[from] FetchError),
}

impl PullError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Fetch(_) => 3,
            Self::Provision { .. } => 4,
            Self::Client(_) => 1,
        }
    }
}
