//! Damage Assess Adapters - External adapters for damage-assess.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - HTTP chat-completion service
//! - Severity-model artifact directory

pub mod fs;
pub mod models;
pub mod openai;

pub use fs::FsImageSource;
pub use models::{artifact_status, artifacts_dir, load_classifier, ArtifactStatus};
pub use openai::{CompletionConfig, OpenAiCompletionService};
