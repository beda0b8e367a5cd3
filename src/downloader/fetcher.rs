use futures::StreamExt;
use std::future::Future;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::progress::Progress;
use super::retry::{Attempt, RetryPolicy, run_with_retry};
use crate::config::SyncConfig;
use crate::error::{FetchError, NetworkError};

/// One remote resource and where it should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub destination: PathBuf,
    /// Used when the response carries no Content-Length; 0 means unknown.
    pub size_hint: u64,
    /// Shown next to the progress bar.
    pub label: String,
}

/// Downloads a resource to disk. Content is not checked here.
pub trait Fetch: Send + Sync + 'static {
    /// Resolves to the number of bytes written.
    fn fetch(&self, request: &FetchRequest)
    -> impl Future<Output = Result<u64, FetchError>> + Send;
}

/// Streams artifacts over HTTP with a flat retry budget.
pub struct HttpFetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
    chunk_size: usize,
    show_progress: bool,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, config: &SyncConfig) -> Self {
        HttpFetcher {
            client,
            retry: config.retry,
            chunk_size: config.chunk_size.max(1),
            show_progress: config.show_progress,
        }
    }

    async fn attempt(&self, request: &FetchRequest, attempt: u32) -> Attempt<u64, NetworkError> {
        // Sibling tasks share parent directories; create_dir_all treats an
        // existing directory as success.
        if let Some(parent) = request.destination.parent() {
            if let Err(err) = tokio::fs::create_dir_all(parent).await {
                return Attempt::Fatal(NetworkError::storage(parent, err));
            }
        }

        debug!(url = %request.url, attempt, "starting transfer");
        match self.transfer(request).await {
            Ok(written) => Attempt::Ok(written),
            Err(err) => {
                if err.is_timeout() {
                    debug!(url = %request.url, attempt, "transfer timed out");
                }
                Attempt::Retryable(err)
            }
        }
    }

    async fn transfer(&self, request: &FetchRequest) -> Result<u64, NetworkError> {
        let url = request.url.as_str();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| NetworkError::request(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status,
            });
        }

        let total = response
            .content_length()
            .filter(|&len| len > 0)
            .unwrap_or(request.size_hint);

        // Truncates whatever a failed attempt left behind
        let storage = |err| NetworkError::storage(&request.destination, err);
        let mut file = tokio::fs::File::create(&request.destination)
            .await
            .map_err(storage)?;

        let mut progress = Progress::new(&request.label, total, self.show_progress);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| NetworkError::request(url, err))?;
            for piece in chunk.chunks(self.chunk_size) {
                file.write_all(piece).await.map_err(storage)?;
                progress.advance(piece.len());
            }
        }
        file.flush().await.map_err(storage)?;

        let written = progress.transferred();
        progress.finish();
        Ok(written)
    }
}

impl Fetch for HttpFetcher {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<u64, FetchError>> + Send {
        async move {
            run_with_retry(&self.retry, |attempt| self.attempt(request, attempt))
                .await
                .map_err(|exhausted| {
                    debug!(
                        url = %request.url,
                        attempts = exhausted.attempts,
                        failures = exhausted.errors.len(),
                        "giving up on transfer"
                    );
                    FetchError {
                        url: request.url.clone(),
                        attempts: exhausted.attempts,
                        errors: exhausted.errors,
                    }
                })
        }
    }
}
