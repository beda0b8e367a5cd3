pub mod executor;
pub mod fetcher;
pub mod outcome;
pub mod planer;
pub mod progress;
pub mod retry;
pub mod verifier;

use crate::config::SyncConfig;
use crate::error::ManifestError;
use crate::manifest::{Manifest, ManifestSource, Version};
use crate::report::console;
use executor::Orchestrator;
use fetcher::HttpFetcher;
use outcome::AggregateResult;

/// Everything a finished run knows about the release it pulled.
#[derive(Debug)]
pub struct SyncRun {
    pub version: Version,
    pub manifest: Manifest,
    pub result: AggregateResult,
}

/// Resolves the latest version and fetches its manifest.
pub async fn discover(
    source: &ManifestSource,
) -> Result<(Version, Manifest), ManifestError> {
    console::print_step("Resolving latest version");
    let version = source.resolve_latest_version().await?;
    console::print_success(&format!("Latest version: {}", version));

    console::print_step("Fetching manifest");
    let manifest = source.fetch_manifest(&version).await?;
    console::print_manifest_summary(&manifest);
    Ok((version, manifest))
}

/// Downloads and verifies every platform of the latest release. Manifest
/// errors abort before any task exists; per-platform failures land in the
/// returned result.
pub async fn download(
    config: &SyncConfig,
    client: reqwest::Client,
) -> Result<SyncRun, ManifestError> {
    let source = ManifestSource::new(client.clone(), &config.base_url);
    let (version, manifest) = discover(&source).await?;

    console::print_step(&format!(
        "Downloading {} artifacts to {}",
        manifest.platforms.len(),
        config.output_dir.join(version.as_str()).display()
    ));
    let orchestrator = Orchestrator::new(HttpFetcher::new(client, config), config);
    let result = orchestrator.run_all(&version, &manifest).await;
    console::print_outcomes(&result);

    Ok(SyncRun {
        version,
        manifest,
        result,
    })
}

/// Re-hashes an existing release directory. `version` defaults to the
/// latest published one.
pub async fn verify(
    config: &SyncConfig,
    client: reqwest::Client,
    version: Option<Version>,
) -> Result<(Version, AggregateResult), ManifestError> {
    let source = ManifestSource::new(client, &config.base_url);
    let version = match version {
        Some(version) => version,
        None => source.resolve_latest_version().await?,
    };
    let manifest = source.fetch_manifest(&version).await?;

    console::print_step(&format!("Verifying release {}", version));
    let planer = planer::Planer::new(&config.base_url, &config.output_dir);
    let verifier = verifier::Verifier::new(config.chunk_size);
    let result = executor::verify_all(&planer, verifier, &version, &manifest).await;
    console::print_outcomes(&result);
    Ok((version, result))
}
