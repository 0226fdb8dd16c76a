//! Integration tests for the HTTP boundary.
//!
//! Each test starts the real server on a free port over a temp corpus file
//! and talks to it with `reqwest`.

use horcrux::config::Config;
use horcrux::server::run_server;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_corpus(tmp: &TempDir, value: &Value) -> PathBuf {
    let path = tmp.path().join("horcrux.json");
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn test_config(corpus: &Path, port: u16, mode: &str) -> Config {
    let config_content = format!(
        r#"
mode = "{}"

[corpus]
path = "{}"

[server]
bind = "127.0.0.1:{}"
"#,
        mode,
        corpus.display(),
        port
    );
    toml::from_str(&config_content).unwrap()
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

async fn start(cfg: Config) -> (tokio::task::JoinHandle<()>, String) {
    let port: u16 = cfg
        .server
        .bind
        .rsplit(':')
        .next()
        .unwrap()
        .parse()
        .unwrap();
    let handle = tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;
    (handle, format!("http://127.0.0.1:{}", port))
}

#[tokio::test]
async fn test_ingest_appends_note() {
    let tmp = TempDir::new().unwrap();
    let corpus = write_corpus(&tmp, &json!({"content": {"notes": []}}));
    let (server, base) = start(test_config(&corpus, find_free_port(), "development")).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/ingest", base))
        .json(&json!({"text": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"ok": true, "notesCount": 1}));

    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(&corpus).unwrap()).unwrap();
    let note = &on_disk["content"]["notes"][0];
    assert_eq!(note["text"], "hello");
    assert_eq!(note["source"], "web-ingest");
    assert!(note["created_at"].as_str().unwrap().ends_with('Z'));

    server.abort();
}

#[tokio::test]
async fn test_ingest_rejects_bad_input() {
    let tmp = TempDir::new().unwrap();
    let corpus = write_corpus(&tmp, &json!({"content": {"notes": []}}));
    let before = std::fs::read(&corpus).unwrap();
    let (server, base) = start(test_config(&corpus, find_free_port(), "development")).await;

    let client = reqwest::Client::new();
    for payload in [json!({}), json!({"text": "   "}), json!({"text": 5}), Value::Null] {
        let resp = client
            .post(format!("{}/api/ingest", base))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "payload {}", payload);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Missing 'text' (string)");
        assert_eq!(body["kind"], "invalid_input");
    }

    // Not JSON at all.
    let resp = client
        .post(format!("{}/api/ingest", base))
        .body("text=hello")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    assert_eq!(std::fs::read(&corpus).unwrap(), before);
    server.abort();
}

#[tokio::test]
async fn test_production_mode_disables_ingest_without_io() {
    let tmp = TempDir::new().unwrap();
    // The corpus file does not exist: a read would fail with a 500.
    let corpus = tmp.path().join("missing.json");
    let (server, base) = start(test_config(&corpus, find_free_port(), "production")).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/ingest", base))
        .json(&json!({"text": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 501);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Ingest disabled in production. Run locally.");
    assert_eq!(body["kind"], "service_disabled");
    assert!(!corpus.exists());

    server.abort();
}

#[tokio::test]
async fn test_read_failure_is_500_with_cause() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("missing.json");
    let (server, base) = start(test_config(&corpus, find_free_port(), "development")).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/ingest", base))
        .json(&json!({"text": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "resource_unavailable");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to read corpus:"));

    server.abort();
}

#[tokio::test]
async fn test_static_route_serves_document() {
    let tmp = TempDir::new().unwrap();
    let doc = json!({
        "meta": {"name": "Rob"},
        "skills": {"primary": ["Rust"]},
        "content": {"notes": []}
    });
    let corpus = write_corpus(&tmp, &doc);
    let (server, base) = start(test_config(&corpus, find_free_port(), "production")).await;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/horcrux.json", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, doc);

    let health: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["mode"], "production");

    server.abort();
}

#[tokio::test]
async fn test_concurrent_http_appends_all_land() {
    let tmp = TempDir::new().unwrap();
    let corpus = write_corpus(&tmp, &json!({"content": {"notes": []}}));
    let (server, base) = start(test_config(&corpus, find_free_port(), "development")).await;

    let client = reqwest::Client::new();
    let mut handles = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        let url = format!("{}/api/ingest", base);
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({"text": format!("note {}", i)}))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap(), 200);
    }

    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(&corpus).unwrap()).unwrap();
    assert_eq!(on_disk["content"]["notes"].as_array().unwrap().len(), 10);

    server.abort();
}
