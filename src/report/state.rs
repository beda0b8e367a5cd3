use std::io;
use std::path::Path;

use crate::manifest::{Manifest, Version};

pub const VERSION_FILE: &str = ".version";
pub const BUILD_DATE_FILE: &str = ".build_date";
pub const CHECKSUMS_FILE: &str = ".checksums";

/// Records the synced release in `dir`. Callers only do this after every
/// platform verified.
pub async fn save_version_info(
    dir: &Path,
    version: &Version,
    manifest: &Manifest,
    checksum_lines: &[String],
) -> io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(VERSION_FILE), version.as_str()).await?;
    tokio::fs::write(dir.join(BUILD_DATE_FILE), &manifest.build_date).await?;
    tokio::fs::write(dir.join(CHECKSUMS_FILE), checksum_lines.join("\n")).await?;
    Ok(())
}
