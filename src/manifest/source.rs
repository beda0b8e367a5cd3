use tracing::{debug, warn};

use super::{Manifest, Version};
use crate::error::{ManifestError, NetworkError};

/// Discovers the latest release and its manifest. No caching: each call is
/// exactly one request.
pub struct ManifestSource {
    client: reqwest::Client,
    base_url: String,
}

impl ManifestSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        ManifestSource {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn manifest_url(&self, version: &Version) -> String {
        format!("{}/{}/manifest.json", self.base_url, version)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, NetworkError> {
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

        let body = response
            .bytes()
            .await
            .map_err(|err| NetworkError::request(url, err))?;
        Ok(body.to_vec())
    }

    pub async fn resolve_latest_version(&self) -> Result<Version, ManifestError> {
        let url = format!("{}/latest", self.base_url);
        let body = self.get_bytes(&url).await?;

        let version = String::from_utf8_lossy(&body).trim().to_string();
        if version.is_empty() {
            return Err(ManifestError::EmptyResponse { url });
        }

        debug!(%version, "resolved latest version");
        Ok(Version::new(version))
    }

    pub async fn fetch_manifest(&self, version: &Version) -> Result<Manifest, ManifestError> {
        let url = self.manifest_url(version);
        let body = self.get_bytes(&url).await?;

        let manifest: Manifest = serde_json::from_slice(&body)
            .map_err(|source| ManifestError::Malformed { url, source })?;

        if manifest.version != version.as_str() {
            warn!(
                requested = %version,
                published = %manifest.version,
                "manifest version differs from the requested version"
            );
        }

        debug!(
            %version,
            platforms = manifest.platforms.len(),
            "fetched manifest"
        );
        Ok(manifest)
    }
}
