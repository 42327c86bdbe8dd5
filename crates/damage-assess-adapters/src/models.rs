//! Severity-model artifact directory adapter.

use damage_assess_core::inference::{
    sha256_hex, ModelLayout, LABEL_ENCODER_FILE, SCALER_FILE, SINGLE_MODEL_FILE,
    VOTING_MODEL_FILE,
};
use damage_assess_core::SeverityClassifier;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Every file name the loader looks for.
pub const ARTIFACT_FILES: &[&str] = &[
    VOTING_MODEL_FILE,
    SINGLE_MODEL_FILE,
    SCALER_FILE,
    LABEL_ENCODER_FILE,
];

/// Returns the default artifact directory.
///
/// Uses `XDG_DATA_HOME/damage-assess/severity` or `~/.local/share/damage-assess/severity`.
#[must_use]
pub fn artifacts_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("damage-assess")
        .join("severity")
}

/// Presence and fingerprint of one artifact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFileStatus {
    /// File name within the directory.
    pub file: &'static str,
    /// SHA-256 when the file exists and is readable.
    pub sha256: Option<String>,
}

/// What an artifact directory contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    /// Directory inspected.
    pub dir: PathBuf,
    /// Layout the loader would pick, if any.
    pub layout: Option<ModelLayout>,
    /// Status of every known file.
    pub files: Vec<ArtifactFileStatus>,
}

impl ArtifactStatus {
    /// Whether the loader has everything it needs.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let present = |name: &str| {
            self.files
                .iter()
                .any(|f| f.file == name && f.sha256.is_some())
        };
        self.layout.is_some() && present(SCALER_FILE) && present(LABEL_ENCODER_FILE)
    }
}

/// Inspects an artifact directory without validating its contents.
#[must_use]
pub fn artifact_status(dir: &Path) -> ArtifactStatus {
    let files = ARTIFACT_FILES
        .iter()
        .map(|&file| ArtifactFileStatus {
            file,
            sha256: fs::read(dir.join(file)).ok().map(|bytes| sha256_hex(&bytes)),
        })
        .collect();

    ArtifactStatus {
        dir: dir.to_path_buf(),
        layout: ModelLayout::detect(dir),
        files,
    }
}

/// Loads the severity classifier, logging and returning `None` on failure.
///
/// The pipeline then runs without the classifier and reports the
/// assessment as degraded.
#[must_use]
pub fn load_classifier(dir: &Path) -> Option<SeverityClassifier> {
    match SeverityClassifier::load(dir) {
        Ok(classifier) => Some(classifier),
        Err(e) => {
            warn!("Severity model unavailable: {e}");
            None
        }
    }
}
