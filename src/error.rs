use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::utils::multierr::MultiError;

/// A single failed transfer attempt. All variants are retried by the fetcher.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("writing {} failed: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl NetworkError {
    pub fn request(url: &str, source: reqwest::Error) -> Self {
        NetworkError::Request {
            url: url.to_string(),
            source,
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        NetworkError::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, NetworkError::Request { source, .. } if source.is_timeout())
    }
}

/// Failure to learn what to download. Fatal for the whole run.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("{url} returned an empty version")]
    EmptyResponse { url: String },

    #[error("malformed manifest at {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One artifact could not be downloaded within its attempt budget.
#[derive(Debug, Error)]
#[error("download of {url} failed after {attempts} attempt(s): {errors}")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    #[source]
    pub errors: MultiError<NetworkError>,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
    Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("cannot hash {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
