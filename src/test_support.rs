//! Mock release bucket for tests.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::SyncConfig;
use crate::downloader::retry::RetryPolicy;

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Config pointed at a local server: no progress bars, no retry delay.
pub fn test_config(base_url: &str, output_dir: &FsPath) -> SyncConfig {
    SyncConfig::default()
        .with_base_url(base_url)
        .with_output_dir(output_dir)
        .with_retry(RetryPolicy::new(3, Duration::ZERO))
        .with_progress(false)
}

#[derive(Default)]
pub struct MockRelease {
    pub version: String,
    pub build_date: String,
    pub artifacts: BTreeMap<String, Vec<u8>>,
    /// Checksums published in the manifest instead of the real digest
    pub checksum_overrides: HashMap<String, String>,
    /// Platforms whose artifact request always answers 500
    pub failing: HashSet<String>,
    /// Replaces the generated manifest body when set
    pub raw_manifest: Option<String>,
    pub hits: Mutex<HashMap<String, usize>>,
    pub latest_hits: AtomicUsize,
}

impl MockRelease {
    pub fn new(version: &str) -> Self {
        MockRelease {
            version: version.to_string(),
            build_date: "2025-06-01T00:00:00Z".to_string(),
            ..Default::default()
        }
    }

    pub fn artifact(mut self, platform: &str, data: &[u8]) -> Self {
        self.artifacts.insert(platform.to_string(), data.to_vec());
        self
    }

    pub fn wrong_checksum(mut self, platform: &str) -> Self {
        self.checksum_overrides
            .insert(platform.to_string(), sha256_hex(b"something else"));
        self
    }

    pub fn failing(mut self, platform: &str) -> Self {
        self.failing.insert(platform.to_string());
        self
    }

    pub fn raw_manifest(mut self, body: &str) -> Self {
        self.raw_manifest = Some(body.to_string());
        self
    }

    pub fn manifest_json(&self) -> String {
        if let Some(raw) = &self.raw_manifest {
            return raw.clone();
        }
        let platforms: serde_json::Map<String, serde_json::Value> = self
            .artifacts
            .iter()
            .map(|(platform, data)| {
                let checksum = self
                    .checksum_overrides
                    .get(platform)
                    .cloned()
                    .unwrap_or_else(|| sha256_hex(data));
                (
                    platform.clone(),
                    serde_json::json!({ "size": data.len(), "checksum": checksum }),
                )
            })
            .collect();
        serde_json::json!({
            "version": self.version,
            "buildDate": self.build_date,
            "platforms": platforms,
        })
        .to_string()
    }

    pub fn hits(&self, platform: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .get(platform)
            .copied()
            .unwrap_or(0)
    }

    /// Starts the server; returns the shared state and the base URL.
    pub async fn start(self) -> (Arc<MockRelease>, String) {
        let state = Arc::new(self);
        let app = Router::new()
            .route("/latest", get(latest_handler))
            .route("/{version}/manifest.json", get(manifest_handler))
            .route("/{version}/{platform}/{binary}", get(artifact_handler))
            .with_state(Arc::clone(&state));
        let base_url = serve(app).await;
        (state, base_url)
    }
}

async fn latest_handler(State(state): State<Arc<MockRelease>>) -> String {
    state.latest_hits.fetch_add(1, Ordering::SeqCst);
    format!("{}\n", state.version)
}

async fn manifest_handler(
    State(state): State<Arc<MockRelease>>,
    Path(version): Path<String>,
) -> Response {
    if version != state.version {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.manifest_json().into_response()
}

async fn artifact_handler(
    State(state): State<Arc<MockRelease>>,
    Path((version, platform, binary)): Path<(String, String, String)>,
) -> Response {
    *state
        .hits
        .lock()
        .unwrap()
        .entry(platform.clone())
        .or_insert(0) += 1;

    if version != state.version || binary != crate::manifest::platform::binary_name(&platform) {
        return StatusCode::NOT_FOUND.into_response();
    }
    if state.failing.contains(&platform) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match state.artifacts.get(&platform) {
        Some(data) => data.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
