//! Run configuration
//!
//! Settings come from the process environment first and a JSON config file
//! second. Only non-identity settings have defaults; a missing base URL,
//! project name or project ID is an error.
//!
//! Environment variables:
//! - `WM_BASE_URL`: tenant base URL (required)
//! - `WM_PROJECT_NAME`: project name used to list assets (required)
//! - `WM_PROJECT_ID`: project ID used to export workflows (required)
//! - `WM_OUTPUT_ROOT` or `GITHUB_REPO_PATH`: output root (default `./github_repo`)
//! - `WM_API_KEY`: API key (optional)
//! - `WM_USERNAME` / `WM_PASSWORD`: basic auth (optional, ignored when an API key is set)
//! - `WM_DOWNLOAD_DELAY_MS`: pause between workflow downloads (default 1000, must not be 0)
//! - `WM_TIMEOUT_SECS`: per-request timeout (default none)
//!
//! Config file format:
//! ```json
//! {
//!   "base_url": "https://tenant.int.ipaas.automation.ibm.com",
//!   "project_name": "MyProject",
//!   "project_id": "fl1234abcd",
//!   "github_repo_path": "./github_repo",
//!   "auth": { "api_key": "..." }
//! }
//! ```

use crate::client::Auth;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_OUTPUT_ROOT: &str = "./github_repo";
pub const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_secs(1);

/// Settings as written in the config file. Every field is optional here;
/// [`Config::resolve`] decides what is required.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    #[serde(alias = "output_root")]
    pub github_repo_path: Option<PathBuf>,
    #[serde(default)]
    pub auth: FileAuth,
    pub download_delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

#[derive(Default, Clone, Deserialize)]
pub struct FileAuth {
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for FileAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAuth")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FileConfig {
    /// Read a config file. JSON5 syntax (comments, trailing commas) is accepted.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        json5::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Immutable settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tenant base URL, without a trailing slash
    pub base_url: Url,
    pub project_name: String,
    pub project_id: String,
    /// Directory that receives `downloaded_assets/`
    pub output_root: PathBuf,
    pub auth: Auth,
    /// Pause between two successive workflow downloads
    pub download_delay: Duration,
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from the environment and a config file.
    ///
    /// With `path: None` the default `config.json` is read if it exists.
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => {
                log::debug!("Reading config file {}", path.display());
                FileConfig::read(path)?
            }
            None => match FileConfig::read(DEFAULT_CONFIG_FILE) {
                Ok(file) => {
                    log::debug!("Reading config file {}", DEFAULT_CONFIG_FILE);
                    file
                }
                Err(ConfigError::FileNotFound { .. }) => {
                    log::debug!("No {} found, using environment only", DEFAULT_CONFIG_FILE);
                    FileConfig::default()
                }
                Err(e) => return Err(e),
            },
        };

        Self::resolve(|key| std::env::var(key).ok(), file)
    }

    /// Merge an environment lookup over a parsed config file.
    ///
    /// Empty environment values count as unset.
    pub fn resolve(
        env: impl Fn(&str) -> Option<String>,
        file: FileConfig,
    ) -> Result<Self, ConfigError> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let base_url = required("base_url", "WM_BASE_URL", env("WM_BASE_URL"), file.base_url)?;
        let base_url = parse_base_url(&base_url)?;
        let project_name = required(
            "project_name",
            "WM_PROJECT_NAME",
            env("WM_PROJECT_NAME"),
            file.project_name,
        )?;
        let project_id = required(
            "project_id",
            "WM_PROJECT_ID",
            env("WM_PROJECT_ID"),
            file.project_id,
        )?;

        let output_root = match env("WM_OUTPUT_ROOT").or_else(|| env("GITHUB_REPO_PATH")) {
            Some(root) => {
                log::debug!("output_root from environment");
                PathBuf::from(root)
            }
            None => match file.github_repo_path {
                Some(root) => {
                    log::debug!("output_root from config file");
                    root
                }
                None => {
                    log::debug!("output_root defaulted to {}", DEFAULT_OUTPUT_ROOT);
                    PathBuf::from(DEFAULT_OUTPUT_ROOT)
                }
            },
        };

        let auth = match env("WM_API_KEY") {
            Some(apikey) => Auth::Apikey(apikey),
            None => match (env("WM_USERNAME"), env("WM_PASSWORD")) {
                (Some(username), Some(password)) => Auth::Basic(username, password),
                _ => Auth::from_parts(
                    file.auth.api_key,
                    file.auth.username,
                    file.auth.password,
                ),
            },
        };
        if auth.is_none() {
            log::warn!("No credential configured, requests will be sent unauthenticated");
        } else {
            log::debug!("credential: {:?}", auth);
        }

        let download_delay = match number("WM_DOWNLOAD_DELAY_MS", env("WM_DOWNLOAD_DELAY_MS"))? {
            Some(ms) => Duration::from_millis(ms),
            None => file
                .download_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DOWNLOAD_DELAY),
        };
        if download_delay.is_zero() {
            return Err(ConfigError::ZeroDelay);
        }

        let request_timeout = number("WM_TIMEOUT_SECS", env("WM_TIMEOUT_SECS"))?
            .or(file.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            base_url,
            project_name,
            project_id,
            output_root,
            auth,
            download_delay,
            request_timeout,
        })
    }
}

fn required(
    key: &'static str,
    env_name: &'static str,
    from_env: Option<String>,
    from_file: Option<String>,
) -> Result<String, ConfigError> {
    if let Some(value) = from_env {
        log::debug!("{} from {}", key, env_name);
        return Ok(value);
    }
    match from_file.filter(|v| !v.trim().is_empty()) {
        Some(value) => {
            log::debug!("{} from config file", key);
            Ok(value)
        }
        None => Err(ConfigError::Missing { key, env: env_name }),
    }
}

fn number(env_name: &'static str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| {
            v.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                env: env_name,
                value: v.clone(),
            })
        })
        .transpose()
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::InvalidUrl {
            value: value.to_string(),
            reason: format!("unsupported scheme `{}`", scheme),
        }),
    }
}
