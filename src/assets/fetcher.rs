//! Manifest fetcher
//!
//! Lists every asset of a project via
//! `GET /apis/v1/rest/projects/{project_name}/assets` and unwraps the
//! top-level `output` field.

use super::AssetManifest;
use crate::client::IntegrationClient;
use crate::error::FetchError;
use crate::etl::Extractor;
use serde_json::Value;

/// Extractor for the project asset manifest
///
/// # Example
/// ```no_run
/// use webmethods_asset_puller::assets::ManifestFetcher;
/// use webmethods_asset_puller::client::{Auth, IntegrationClient};
/// use webmethods_asset_puller::etl::Extractor;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// let url = Url::parse("https://tenant.example.com")?;
/// let client = IntegrationClient::try_new(url, &Auth::None, None)?;
/// let manifest = ManifestFetcher::new(client, "MyProject").extract().await?;
/// println!("{} workflow(s)", manifest.workflows.len());
/// # Ok(())
/// # }
/// ```
pub struct ManifestFetcher {
    client: IntegrationClient,
    project_name: String,
}

impl ManifestFetcher {
    pub fn new(client: IntegrationClient, project_name: impl Into<String>) -> Self {
        Self {
            client,
            project_name: project_name.into(),
        }
    }

    /// Fetch and unwrap the manifest. Any failure here is fatal for a run.
    pub async fn fetch(&self) -> Result<AssetManifest, FetchError> {
        let url = self.client.assets_url(&self.project_name);
        log::info!("Fetching assets from {}", url);

        let response = self
            .client
            .get_assets(&self.project_name)
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { url, status, body });
        }

        let mut body: Value = response
            .json()
            .await
            .map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;

        let output = match body.get_mut("output").map(Value::take) {
            Some(Value::Null) | None => return Err(FetchError::MissingOutput { url }),
            Some(output) => output,
        };

        let manifest: AssetManifest =
            serde_json::from_value(output).map_err(|source| FetchError::Malformed {
                url: url.clone(),
                source,
            })?;

        for category in manifest.unknown_categories() {
            log::debug!("Ignoring asset category '{}'", category);
        }

        log::info!(
            "Retrieved {} workflow(s), {} flow(s), {} listener provider(s), {} messaging record(s)",
            manifest.workflows.len(),
            manifest.flows.len(),
            manifest.listeners.len(),
            manifest.messaging.len()
        );

        Ok(manifest)
    }
}

impl Extractor for ManifestFetcher {
    type Output = AssetManifest;
    type Error = FetchError;

    async fn extract(&self) -> Result<Self::Output, Self::Error> {
        self.fetch().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetRecord;
    use crate::client::{API_KEY_HEADER, Auth};
    use httpmock::prelude::*;
    use serde_json::json;
    use url::Url;

    fn fetcher(server: &MockServer, auth: Auth) -> ManifestFetcher {
        let url = Url::parse(&server.base_url()).unwrap();
        let client = IntegrationClient::try_new(url, &auth, None).unwrap();
        ManifestFetcher::new(client, "TestProject")
    }

    #[tokio::test]
    async fn test_fetch_unwraps_output() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/apis/v1/rest/projects/TestProject/assets")
                    .header(API_KEY_HEADER, "test_api_key");
                then.status(200).json_body(json!({
                    "output": {
                        "workflows": ["wf1", "wf2"],
                        "flows": ["f1"],
                        "listener": [],
                        "messaging": ["m1"]
                    }
                }));
            })
            .await;

        let manifest = fetcher(&server, Auth::Apikey("test_api_key".to_string()))
            .extract()
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(manifest.workflows, vec!["wf1", "wf2"]);
        assert_eq!(manifest.flows, vec![AssetRecord::from("f1")]);
        assert!(manifest.listeners.is_empty());
        assert_eq!(manifest.messaging, vec![AssetRecord::from("m1")]);
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/apis/v1/rest/projects/TestProject/assets");
                then.status(500).body("boom");
            })
            .await;

        let err = fetcher(&server, Auth::None).fetch().await.unwrap_err();
        match err {
            FetchError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_without_output_wrapper() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/apis/v1/rest/projects/TestProject/assets");
                then.status(200).json_body(json!({"workflows": ["wf1"]}));
            })
            .await;

        let err = fetcher(&server, Auth::None).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::MissingOutput { .. }));
    }

    #[tokio::test]
    async fn test_fetch_non_json_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/apis/v1/rest/projects/TestProject/assets");
                then.status(200).body("<html>login</html>");
            })
            .await;

        let err = fetcher(&server, Auth::None).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_manifest() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/apis/v1/rest/projects/TestProject/assets");
                then.status(200)
                    .json_body(json!({"output": {"workflows": "not-a-list"}}));
            })
            .await;

        let err = fetcher(&server, Auth::None).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        // Bind then drop a listener to get a port nothing is serving on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = Url::parse(&format!("http://127.0.0.1:{}", port)).unwrap();
        let client = IntegrationClient::try_new(url, &Auth::None, None).unwrap();

        let err = ManifestFetcher::new(client, "TestProject")
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
