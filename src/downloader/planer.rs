use std::path::{Path, PathBuf};

use super::fetcher::FetchRequest;
use crate::manifest::platform::{binary_name, output_filename};
use crate::manifest::{Manifest, PlatformSpec, Version};

/// Lifecycle of a download task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Fetching,
    Verifying,
    FetchFailed,
    Success,
    ChecksumMismatch,
}

impl TaskState {
    pub fn can_advance_to(self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Pending, TaskState::Fetching)
                | (TaskState::Fetching, TaskState::FetchFailed)
                | (TaskState::Fetching, TaskState::Verifying)
                | (TaskState::Verifying, TaskState::Success)
                | (TaskState::Verifying, TaskState::ChecksumMismatch)
        )
    }
}

#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub platform: String,
    pub spec: PlatformSpec,
    pub url: String,
    pub destination: PathBuf,
    pub output_filename: String,
    state: TaskState,
}

impl DownloadTask {
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Moves to `next`; illegal transitions are refused and leave the state as is.
    pub fn advance(&mut self, next: TaskState) -> bool {
        if self.state.can_advance_to(next) {
            self.state = next;
            true
        } else {
            false
        }
    }

    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            url: self.url.clone(),
            destination: self.destination.clone(),
            size_hint: self.spec.size,
            label: self.output_filename.clone(),
        }
    }
}

/// Turns a manifest into one task per platform.
pub struct Planer {
    base_url: String,
    output_dir: PathBuf,
}

impl Planer {
    pub fn new(base_url: &str, output_dir: &Path) -> Self {
        Planer {
            base_url: base_url.trim_end_matches('/').to_string(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn release_dir(&self, version: &Version) -> PathBuf {
        self.output_dir.join(version.as_str())
    }

    pub fn artifact_url(&self, version: &Version, platform: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            version,
            platform,
            binary_name(platform)
        )
    }

    /// Tasks come out in platform-key order.
    pub fn plan(&self, version: &Version, manifest: &Manifest) -> Vec<DownloadTask> {
        let release_dir = self.release_dir(version);
        manifest
            .platforms
            .iter()
            .map(|(platform, spec)| {
                let output_filename = output_filename(platform);
                DownloadTask {
                    platform: platform.clone(),
                    spec: spec.clone(),
                    url: self.artifact_url(version, platform),
                    destination: release_dir.join(&output_filename),
                    output_filename,
                    state: TaskState::Pending,
                }
            })
            .collect()
    }
}
