//! Progress reporting port for UI integration.

/// Events emitted while an incident's images are processed.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Feature extraction started for an image.
    Started {
        /// Image reference.
        image: String,
        /// Index in the incident (0-based).
        index: usize,
        /// Total images in the incident.
        total: usize,
    },
    /// Features were extracted successfully.
    Extracted {
        /// Image reference.
        image: String,
    },
    /// The image could not be decoded; a zero vector was used.
    Degraded {
        /// Image reference.
        image: String,
        /// Reason for degradation.
        reason: String,
    },
    /// All images have been processed.
    Finished {
        /// Images with usable features.
        extracted: usize,
        /// Images that degraded to zero vectors.
        degraded: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}
