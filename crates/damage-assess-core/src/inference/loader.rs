//! Artifact file loading and fingerprinting.

use std::path::Path;

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::ArtifactError;

/// A deserialized artifact together with the SHA-256 of its bytes.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    /// Parsed artifact.
    pub value: T,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
}

/// Reads and parses one JSON artifact.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The contents are not valid JSON for `T`
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Loaded<T>, ArtifactError> {
    debug!("Loading artifact from {}", path.display());

    if !path.is_file() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }

    let data = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value = serde_json::from_slice(&data).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Loaded {
        value,
        sha256: sha256_hex(&data),
    })
}

/// Lowercase hex SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .fold(String::with_capacity(64), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        })
}
