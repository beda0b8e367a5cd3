use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::fetcher::Fetch;
use super::outcome::{AggregateResult, DownloadOutcome};
use super::planer::{DownloadTask, Planer, TaskState};
use super::verifier::Verifier;
use crate::config::SyncConfig;
use crate::error::VerifyError;
use crate::manifest::{Manifest, Version};
use crate::utils::limited_spawner::LimitedSpawner;

/// Fans out one fetch-and-verify task per platform under a fixed permit
/// budget and joins them all before returning.
pub struct Orchestrator<F> {
    fetcher: Arc<F>,
    verifier: Verifier,
    planer: Planer,
    concurrency: usize,
}

impl<F: Fetch> Orchestrator<F> {
    pub fn new(fetcher: F, config: &SyncConfig) -> Self {
        Orchestrator {
            fetcher: Arc::new(fetcher),
            verifier: Verifier::new(config.chunk_size),
            planer: Planer::new(&config.base_url, &config.output_dir),
            concurrency: config.concurrency,
        }
    }

    /// Produces exactly one outcome per manifest platform. Dropping the
    /// returned future aborts every task still in flight.
    pub async fn run_all(&self, version: &Version, manifest: &Manifest) -> AggregateResult {
        let tasks = self.planer.plan(version, manifest);
        info!(
            %version,
            tasks = tasks.len(),
            concurrency = self.concurrency,
            "starting downloads"
        );

        let mut spawner = LimitedSpawner::new(self.concurrency);
        let mut platforms = HashMap::with_capacity(tasks.len());
        let mut outcomes = Vec::with_capacity(tasks.len());

        for task in tasks {
            let platform = task.platform.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let spawned = spawner
                .spawn(run_task(fetcher, self.verifier, task))
                .await;
            match spawned {
                Ok(id) => {
                    debug!(
                        %platform,
                        free_permits = spawner.available_permits(),
                        "task scheduled"
                    );
                    platforms.insert(id, platform);
                }
                Err(err) => {
                    error!(%platform, error = %err, "could not schedule download");
                    outcomes.push(DownloadOutcome::fetch_failed(
                        &platform,
                        format!("not scheduled: {}", err),
                    ));
                }
            }
        }

        for (id, joined) in spawner.join_all().await {
            let Some(platform) = platforms.remove(&id) else {
                warn!(?id, "joined a task that was never scheduled");
                continue;
            };
            outcomes.push(match joined {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(%platform, error = %err, "download task aborted");
                    DownloadOutcome::fetch_failed(&platform, format!("task panicked: {}", err))
                }
            });
        }

        let result = AggregateResult::from_outcomes(outcomes);
        info!(
            success = result.success_count,
            total = result.total_count,
            "downloads finished"
        );
        result
    }
}

async fn run_task<F: Fetch>(
    fetcher: Arc<F>,
    verifier: Verifier,
    mut task: DownloadTask,
) -> DownloadOutcome {
    transition(&mut task, TaskState::Fetching);
    info!(platform = %task.platform, file = %task.output_filename, "downloading");

    if let Err(err) = fetcher.fetch(&task.fetch_request()).await {
        transition(&mut task, TaskState::FetchFailed);
        error!(platform = %task.platform, error = %err, "download failed");
        // A dropped connection can leave a truncated body behind
        discard(&task.destination).await;
        return DownloadOutcome::fetch_failed(&task.platform, err.to_string());
    }

    transition(&mut task, TaskState::Verifying);
    match verifier.verify(&task.destination, &task.spec.checksum).await {
        Ok(actual) => {
            transition(&mut task, TaskState::Success);
            info!(platform = %task.platform, checksum = %actual, "checksum verified");
            DownloadOutcome::success(&task.platform, actual, task.output_filename)
        }
        Err(err) => {
            transition(&mut task, TaskState::ChecksumMismatch);
            error!(platform = %task.platform, error = %err, "verification failed");
            // Only verified artifacts may stay on disk
            discard(&task.destination).await;
            let (expected, actual) = match err {
                VerifyError::Mismatch {
                    expected, actual, ..
                } => (expected, actual),
                VerifyError::Io { source, .. } => (
                    task.spec.checksum.to_lowercase(),
                    format!("unreadable ({})", source),
                ),
            };
            DownloadOutcome::checksum_mismatch(&task.platform, expected, actual)
        }
    }
}

fn transition(task: &mut DownloadTask, next: TaskState) {
    let from = task.state();
    let moved = task.advance(next);
    debug_assert!(moved, "illegal task transition {:?} -> {:?}", from, next);
    debug!(platform = %task.platform, state = ?task.state(), "task state");
}

async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed unverified artifact"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), error = %err, "could not remove unverified artifact"),
    }
}

/// Re-checks artifacts already on disk. Read-only: nothing is deleted.
pub async fn verify_all(
    planer: &Planer,
    verifier: Verifier,
    version: &Version,
    manifest: &Manifest,
) -> AggregateResult {
    let mut outcomes = Vec::with_capacity(manifest.platforms.len());
    for task in planer.plan(version, manifest) {
        if !task.destination.exists() {
            outcomes.push(DownloadOutcome::fetch_failed(
                &task.platform,
                format!("{} is missing", task.destination.display()),
            ));
            continue;
        }
        outcomes.push(
            match verifier.verify(&task.destination, &task.spec.checksum).await {
                Ok(actual) => DownloadOutcome::success(&task.platform, actual, task.output_filename),
                Err(VerifyError::Mismatch {
                    expected, actual, ..
                }) => DownloadOutcome::checksum_mismatch(&task.platform, expected, actual),
                Err(err @ VerifyError::Io { .. }) => {
                    DownloadOutcome::fetch_failed(&task.platform, err.to_string())
                }
            },
        );
    }
    AggregateResult::from_outcomes(outcomes)
}
