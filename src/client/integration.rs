//! webMethods.io Integration client
//!
//! Provides `IntegrationClient` for the project asset and workflow export
//! endpoints under `/apis/v1/rest/projects/`.

use super::Auth;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

const API_PREFIX: [&str; 4] = ["apis", "v1", "rest", "projects"];

/// Client for a single integration tenant.
///
/// Holds two HTTP clients: `api` carries the credential headers and is used
/// for every `/apis/...` call, `links` is bare and only fetches the
/// pre-signed download links returned by the export endpoint, so the
/// credential never leaves for a third-party host.
///
/// # Example
/// ```no_run
/// use webmethods_asset_puller::client::{Auth, IntegrationClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// let url = Url::parse("https://tenant.int.ipaas.automation.ibm.com")?;
/// let client = IntegrationClient::try_new(url, &Auth::Apikey("key".into()), None)?;
/// let response = client.get_assets("MyProject").await?;
/// assert!(response.status().is_success());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct IntegrationClient {
    api: Client,
    links: Client,
    base_url: Url,
}

impl IntegrationClient {
    /// Create a client for the tenant at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot carry a path, the credential
    /// is not a valid header value, or the HTTP client cannot be built.
    pub fn try_new(
        base_url: Url,
        auth: &Auth,
        timeout: Option<Duration>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if base_url.cannot_be_a_base() {
            return Err(format!("base URL {} cannot carry an API path", base_url).into());
        }

        let mut api = Client::builder().default_headers(auth.headers()?);
        let mut links = Client::builder();
        if let Some(timeout) = timeout {
            api = api.timeout(timeout);
            links = links.timeout(timeout);
        }

        Ok(Self {
            api: api.build()?,
            links: links.build()?,
            base_url,
        })
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // try_new rejects cannot-be-a-base URLs, so this always applies
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        url
    }

    /// `{base}/apis/v1/rest/projects/{project_name}/assets`
    pub fn assets_url(&self, project_name: &str) -> Url {
        self.endpoint(&[project_name, "assets"])
    }

    /// `{base}/apis/v1/rest/projects/{project_id}/workflows/{workflow_id}/export`
    pub fn export_url(&self, project_id: &str, workflow_id: &str) -> Url {
        self.endpoint(&[project_id, "workflows", workflow_id, "export"])
    }

    /// List every asset in a project.
    pub async fn get_assets(&self, project_name: &str) -> reqwest::Result<Response> {
        let url = self.assets_url(project_name);
        log::debug!("GET {}", url);
        self.api.get(url).send().await
    }

    /// Ask the tenant to export a workflow and hand back a download link.
    pub async fn request_export(
        &self,
        project_id: &str,
        workflow_id: &str,
    ) -> reqwest::Result<Response> {
        let url = self.export_url(project_id, workflow_id);
        log::debug!("POST {}", url);
        self.api.post(url).send().await
    }

    /// Fetch a download link without credentials.
    pub async fn fetch_link(&self, link: Url) -> reqwest::Result<Response> {
        log::debug!("GET {}", link_for_log(&link));
        self.links.get(link).send().await
    }
}

/// Origin and path of a pre-signed link; the query carries the signature.
fn link_for_log(link: &Url) -> String {
    format!("{}{}", link.origin().ascii_serialization(), link.path())
}

impl std::fmt::Display for IntegrationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base_url)
    }
}
