//! End-to-end pulls against a mocked integration tenant

use httpmock::prelude::*;
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use webmethods_asset_puller::assets::PersistOutcome;
use webmethods_asset_puller::client::API_KEY_HEADER;
use webmethods_asset_puller::{Auth, Config, PullError, Puller};

const ASSETS_PATH: &str = "/apis/v1/rest/projects/TestProject/assets";

fn config(server: &MockServer, output_root: &Path) -> Config {
    Config {
        base_url: Url::parse(&server.base_url()).unwrap(),
        project_name: "TestProject".to_string(),
        project_id: "test123".to_string(),
        output_root: output_root.to_path_buf(),
        auth: Auth::Apikey("test_api_key".to_string()),
        download_delay: Duration::from_millis(1),
        request_timeout: Some(Duration::from_secs(10)),
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_full_pull() {
    let server = MockServer::start_async().await;
    let assets = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(ASSETS_PATH)
                .header(API_KEY_HEADER, "test_api_key");
            then.status(200).json_body(json!({
                "output": {
                    "workflows": ["wf1"],
                    "flows": ["f1"],
                    "listener": [],
                    "messaging": ["m1"]
                }
            }));
        })
        .await;
    let export = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/apis/v1/rest/projects/test123/workflows/wf1/export")
                .header(API_KEY_HEADER, "test_api_key");
            then.status(200).json_body(json!({
                "output": {"download_link": server.url("/download/wf1/file.zip")}
            }));
        })
        .await;
    let archive = server
        .mock_async(|when, then| {
            when.method(GET).path("/download/wf1/file.zip");
            then.status(200).body(b"test content");
        })
        .await;

    let temp = TempDir::new().unwrap();
    let report = Puller::new(config(&server, temp.path()))
        .unwrap()
        .run()
        .await
        .unwrap();

    assets.assert_async().await;
    export.assert_async().await;
    archive.assert_async().await;
    assert!(report.is_clean());

    let root = temp.path().join("downloaded_assets");
    assert_eq!(
        std::fs::read(root.join("workflows/wf1.zip")).unwrap(),
        b"test content"
    );
    assert_eq!(read_json(&root.join("flows/flow_list.json")), json!(["f1"]));
    assert!(!root.join("listeners/listener_list.json").exists());
    assert_eq!(
        read_json(&root.join("messaging/messaging_list.json")),
        json!(["m1"])
    );
    assert_eq!(report.listeners.as_ref().unwrap(), &PersistOutcome::Skipped);
}

#[tokio::test]
async fn test_manifest_failure_aborts_run() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(ASSETS_PATH);
            then.status(500).body("internal error");
        })
        .await;
    let export = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let temp = TempDir::new().unwrap();
    let err = Puller::new(config(&server, temp.path()))
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PullError::Fetch(_)));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(export.hits_async().await, 0);

    // directories are provisioned, nothing else written
    let root = temp.path().join("downloaded_assets");
    for dir in ["workflows", "flows", "listeners", "messaging"] {
        let entries = std::fs::read_dir(root.join(dir)).unwrap().count();
        assert_eq!(entries, 0, "{} should be empty", dir);
    }
}

#[tokio::test]
async fn test_one_bad_workflow_does_not_stop_the_rest() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(ASSETS_PATH);
            then.status(200).json_body(json!({
                "output": {
                    "workflows": ["wf1", "wf2", "wf3"],
                    "flows": [],
                    "listener": [{
                        "providerName": "WmSAP",
                        "adapterID": "com.wm.adapter.sap.SAPAdapter",
                        "listenerListData": []
                    }],
                    "messaging": []
                }
            }));
        })
        .await;
    for id in ["wf1", "wf3"] {
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("/apis/v1/rest/projects/test123/workflows/{}/export", id));
                then.status(200).json_body(json!({
                    "output": {"download_link": server.url(format!("/download/{}", id))}
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/download/{}", id));
                then.status(200).body(format!("archive {}", id));
            })
            .await;
    }
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/apis/v1/rest/projects/test123/workflows/wf2/export");
            then.status(200).json_body(json!({"output": {}}));
        })
        .await;

    let temp = TempDir::new().unwrap();
    let mut config = config(&server, temp.path());
    config.download_delay = Duration::from_millis(20);
    let report = Puller::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.failure_count(), 1);
    assert_eq!(
        report
            .failed_workflows()
            .map(|e| e.workflow_id())
            .collect::<Vec<_>>(),
        vec!["wf2"]
    );

    let workflows = temp.path().join("downloaded_assets/workflows");
    assert_eq!(
        std::fs::read_to_string(workflows.join("wf1.zip")).unwrap(),
        "archive wf1"
    );
    assert!(!workflows.join("wf2.zip").exists());
    assert_eq!(
        std::fs::read_to_string(workflows.join("wf3.zip")).unwrap(),
        "archive wf3"
    );

    // listener records are saved exactly as served
    let listeners = read_json(
        &temp
            .path()
            .join("downloaded_assets/listeners/listener_list.json"),
    );
    assert_eq!(listeners[0]["providerName"], "WmSAP");
    assert_eq!(listeners[0]["listenerListData"], json!([]));
    assert!(matches!(report.flows, Ok(PersistOutcome::Skipped)));
}

#[tokio::test]
async fn test_rerun_overwrites_previous_output() {
    let server = MockServer::start_async().await;
    let mut assets = server
        .mock_async(|when, then| {
            when.method(GET).path(ASSETS_PATH);
            then.status(200)
                .json_body(json!({"output": {"flows": ["old"]}}));
        })
        .await;

    let temp = TempDir::new().unwrap();
    let puller = Puller::new(config(&server, temp.path())).unwrap();
    puller.run().await.unwrap();

    assets.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(ASSETS_PATH);
            then.status(200)
                .json_body(json!({"output": {"flows": ["new", "newer"]}}));
        })
        .await;
    puller.run().await.unwrap();

    let flows = read_json(&temp.path().join("downloaded_assets/flows/flow_list.json"));
    assert_eq!(flows, json!(["new", "newer"]));
}

#[tokio::test]
async fn test_fetch_manifest_touches_no_files() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(ASSETS_PATH);
            then.status(200)
                .json_body(json!({"output": {"workflows": ["wf1"]}}));
        })
        .await;

    let temp = TempDir::new().unwrap();
    let manifest = Puller::new(config(&server, temp.path()))
        .unwrap()
        .fetch_manifest()
        .await
        .unwrap();

    assert_eq!(manifest.workflows, vec!["wf1"]);
    assert!(!temp.path().join("downloaded_assets").exists());
}
