//! Integration tests for filesystem image discovery and artifact inspection.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use damage_assess_adapters::{artifact_status, load_classifier, FsImageSource};
use damage_assess_core::inference::ModelLayout;
use damage_assess_core::{ImageInput, ImageSource};
use damage_assess_test_support::{SeverityArtifactBuilder, SyntheticImageBuilder};
use tempfile::TempDir;

fn incident_dir() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let panel = SyntheticImageBuilder::scratched_panel(16, 16);
    SyntheticImageBuilder::write_png(dir.path(), "b_rear.png", &panel).expect("write");
    SyntheticImageBuilder::write_png(dir.path(), "a_front.png", &panel).expect("write");
    std::fs::write(dir.path().join("claim.txt"), "policy 123").expect("write");

    let nested = dir.path().join("closeups");
    std::fs::create_dir(&nested).expect("mkdir");
    SyntheticImageBuilder::write_png(&nested, "c_door.png", &panel).expect("write");
    dir
}

fn file_names(images: &[ImageInput]) -> Vec<String> {
    images
        .iter()
        .map(|i| match i {
            ImageInput::Path(p) => p.file_name().unwrap().to_string_lossy().into_owned(),
            ImageInput::Bytes { name, .. } => name.clone(),
        })
        .collect()
}

#[test]
fn test_directory_is_sorted_and_filtered() {
    let dir = incident_dir();
    let source = FsImageSource::new(vec![dir.path().to_path_buf()], false);

    let images = source.images();
    assert_eq!(file_names(&images), vec!["a_front.png", "b_rear.png"]);
    assert_eq!(source.count_hint(), Some(2));
}

#[test]
fn test_recursive_includes_subdirectories() {
    let dir = incident_dir();
    let source = FsImageSource::new(vec![dir.path().to_path_buf()], true);

    let images = source.images();
    assert_eq!(
        file_names(&images),
        vec!["a_front.png", "b_rear.png", "c_door.png"]
    );
}

#[test]
fn test_explicit_files_keep_argument_order() {
    let dir = incident_dir();
    let source = FsImageSource::new(
        vec![
            dir.path().join("b_rear.png"),
            dir.path().join("claim.txt"),
            dir.path().join("a_front.png"),
        ],
        false,
    );

    assert_eq!(file_names(&source.images()), vec!["b_rear.png", "a_front.png"]);
}

#[test]
fn test_collected_paths_are_readable() {
    let dir = incident_dir();
    let source = FsImageSource::new(vec![dir.path().join("a_front.png")], false);

    let images = source.images();
    let bytes = images[0].read_bytes().expect("readable");
    assert_eq!(ImageInput::mime_type(&bytes), "image/png");
}

#[test]
fn test_artifact_status_reports_fingerprints() {
    let dir = TempDir::new().expect("tempdir");
    SeverityArtifactBuilder::new()
        .layout(ModelLayout::Single)
        .write(dir.path())
        .expect("artifacts");

    let status = artifact_status(dir.path());
    assert_eq!(status.layout, Some(ModelLayout::Single));
    assert!(status.is_complete());

    let present: Vec<&str> = status
        .files
        .iter()
        .filter(|f| f.sha256.is_some())
        .map(|f| f.file)
        .collect();
    assert_eq!(present, vec!["model.json", "scaler.json", "label_encoder.json"]);
    assert!(status
        .files
        .iter()
        .filter_map(|f| f.sha256.as_deref())
        .all(|sha| sha.len() == 64));
}

#[test]
fn test_load_classifier_rejects_dimension_mismatch() {
    let dir = TempDir::new().expect("tempdir");
    SeverityArtifactBuilder::new()
        .features(10)
        .write(dir.path())
        .expect("artifacts");

    assert!(artifact_status(dir.path()).is_complete());
    assert!(load_classifier(dir.path()).is_none());
}

#[test]
fn test_load_classifier_rejects_unknown_label() {
    let dir = TempDir::new().expect("tempdir");
    SeverityArtifactBuilder::new()
        .labels(&["01-minor", "02-catastrophic", "03-severe"])
        .write(dir.path())
        .expect("artifacts");

    assert!(load_classifier(dir.path()).is_none());
}
