//! Streaming SHA-256 verification of downloaded artifacts.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::config::CHUNK_SIZE;
use crate::error::VerifyError;

/// Compute SHA-256 of a file as lowercase hex, reading `chunk_size` bytes at
/// a time so large binaries never sit in memory whole.
pub fn sha256_file(path: &Path, chunk_size: usize) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Debug, Clone, Copy)]
pub struct Verifier {
    chunk_size: usize,
}

impl Default for Verifier {
    fn default() -> Self {
        Verifier::new(CHUNK_SIZE)
    }
}

impl Verifier {
    pub fn new(chunk_size: usize) -> Self {
        Verifier { chunk_size }
    }

    /// Returns the actual digest when it equals `expected`, ignoring case.
    /// Never deletes the file; that is up to the caller.
    pub async fn verify(&self, path: &Path, expected: &str) -> Result<String, VerifyError> {
        let owned: PathBuf = path.to_path_buf();
        let chunk_size = self.chunk_size;
        // Hashing is blocking I/O plus CPU; keep it off the async workers.
        let hashed = tokio::task::spawn_blocking(move || sha256_file(&owned, chunk_size))
            .await
            .map_err(io::Error::other)
            .and_then(|result| result);

        let actual = hashed.map_err(|source| VerifyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let expected = expected.trim().to_lowercase();
        if actual == expected {
            Ok(actual)
        } else {
            Err(VerifyError::Mismatch {
                path: path.to_path_buf(),
                expected,
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sha256_hex;
    use std::io::Write;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_sha256_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(sha256_file(f.path(), CHUNK_SIZE).unwrap(), EMPTY_SHA256);
    }

    #[test]
    fn test_sha256_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        assert_eq!(
            sha256_file(f.path(), CHUNK_SIZE).unwrap(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn test_streaming_matches_one_shot_digest() {
        // Spans several chunks and ends mid-chunk
        let data: Vec<u8> = (0..(5 * CHUNK_SIZE + 123)).map(|i| (i % 251) as u8).collect();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();
        f.flush().unwrap();

        assert_eq!(sha256_file(f.path(), CHUNK_SIZE).unwrap(), sha256_hex(&data));
        assert_eq!(sha256_file(f.path(), 7).unwrap(), sha256_hex(&data));
    }

    #[tokio::test]
    async fn test_verify_is_case_insensitive() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"artifact").unwrap();
        f.flush().unwrap();
        let expected = sha256_hex(b"artifact").to_uppercase();

        let actual = Verifier::default().verify(f.path(), &expected).await.unwrap();

        assert_eq!(actual, sha256_hex(b"artifact"));
    }

    #[tokio::test]
    async fn test_verify_is_idempotent() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"same bytes").unwrap();
        f.flush().unwrap();
        let expected = sha256_hex(b"same bytes");
        let verifier = Verifier::default();

        let first = verifier.verify(f.path(), &expected).await.unwrap();
        let second = verifier.verify(f.path(), &expected).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_verify_empty_artifact() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let actual = Verifier::default()
            .verify(f.path(), EMPTY_SHA256)
            .await
            .unwrap();
        assert_eq!(actual, EMPTY_SHA256);
    }

    #[tokio::test]
    async fn test_verify_mismatch_keeps_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"tampered").unwrap();
        f.flush().unwrap();

        let err = Verifier::default()
            .verify(f.path(), &sha256_hex(b"original"))
            .await
            .unwrap_err();

        match err {
            VerifyError::Mismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, sha256_hex(b"original"));
                assert_eq!(actual, sha256_hex(b"tampered"));
            }
            other => panic!("Expected mismatch, got {:?}", other),
        }
        assert!(f.path().exists());
    }

    #[tokio::test]
    async fn test_verify_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Verifier::default()
            .verify(&dir.path().join("absent"), EMPTY_SHA256)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::Io { .. }));
    }
}
