//! Tuning for a sync run.
//!
//! Every knob lives in one immutable [`SyncConfig`] that is handed to the
//! manifest source, the fetcher and the orchestrator at construction. Only
//! the base URL and output locations are meant to change between runs; the
//! rest are fixed defaults that tests may shrink.

use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::retry::RetryPolicy;

/// Release bucket queried when neither `--base-url` nor `GCS_BUCKET` is set.
pub const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com/claude-code-dist-86c565f3-f756-42ad-8dfa-d59b1c096819/claude-code-releases";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "GCS_BUCKET";

pub const DEFAULT_OUTPUT_DIR: &str = "releases";

pub const MAX_CONCURRENT_DOWNLOADS: usize = 7;
pub const MAX_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(2);
pub const CHUNK_SIZE: usize = 8 * 1024;
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const POOL_MAX_PER_HOST: usize = 7;
pub const POOL_MAX_TOTAL: usize = 10;

// One connection per in-flight task, so the permit count bounds the total.
const _: () = assert!(MAX_CONCURRENT_DOWNLOADS <= POOL_MAX_TOTAL);

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub retry: RetryPolicy,
    pub chunk_size: usize,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub pool_max_per_host: usize,
    /// Upper bound on simultaneous connections. reqwest has no global cap;
    /// each task holds at most one connection, so `concurrency` is clamped
    /// to this value whenever it is set, `Default` included.
    pub pool_max_total: usize,
    pub show_progress: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            // Filled in through the builders below
            concurrency: 0,
            retry: RetryPolicy::default(),
            chunk_size: CHUNK_SIZE,
            connect_timeout: Duration::ZERO,
            request_timeout: Duration::ZERO,
            pool_max_per_host: POOL_MAX_PER_HOST,
            pool_max_total: POOL_MAX_TOTAL,
            show_progress: true,
        }
        .with_concurrency(MAX_CONCURRENT_DOWNLOADS)
        .with_timeouts(CONNECT_TIMEOUT, REQUEST_TIMEOUT)
    }
}

impl SyncConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url.into());
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.min(self.pool_max_total);
        self
    }

    /// Both bounds apply to every request; an elapsed one counts as a failed
    /// attempt.
    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Shared client for the whole run: one connection pool, bounded connect
    /// and total-request timeouts.
    pub fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .pool_max_idle_per_host(self.pool_max_per_host)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
