use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod platform;
pub mod source;

pub use source::ManifestSource;

/// Opaque release identifier. Only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    pub fn new(version: impl Into<String>) -> Self {
        Version(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expected size and digest of one platform artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSpec {
    /// Bytes; 0 when the publisher does not know
    pub size: u64,
    /// SHA-256, hex
    pub checksum: String,
}

/// Release manifest as published next to the artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    pub build_date: String,
    /// Keyed and iterated in platform-key order
    pub platforms: BTreeMap<String, PlatformSpec>,
}

impl Manifest {
    pub fn total_size(&self) -> u64 {
        self.platforms.values().map(|spec| spec.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_from_json() {
        let json = r#"{
            "version": "1.0.42",
            "buildDate": "2025-06-01T12:00:00Z",
            "commit": "ignored",
            "platforms": {
                "linux-x64": {"size": 10, "checksum": "AB"},
                "darwin-arm64": {"size": 20, "checksum": "cd"}
            }
        }"#;

        let manifest: Manifest = serde_json::from_str(json).unwrap();

        assert_eq!(manifest.version, "1.0.42");
        assert_eq!(manifest.build_date, "2025-06-01T12:00:00Z");
        assert_eq!(manifest.total_size(), 30);
        let keys: Vec<_> = manifest.platforms.keys().cloned().collect();
        assert_eq!(keys, vec!["darwin-arm64", "linux-x64"]);
    }

    #[test]
    fn test_negative_size_is_rejected() {
        let json = r#"{"version": "1", "buildDate": "d",
            "platforms": {"linux-x64": {"size": -1, "checksum": "ab"}}}"#;
        assert!(serde_json::from_str::<Manifest>(json).is_err());
    }

    #[test]
    fn test_version_display() {
        let version = Version::new("2.0.1");
        assert_eq!(version.to_string(), "2.0.1");
        assert_eq!(version.as_str(), "2.0.1");
    }
}
