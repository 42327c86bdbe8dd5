//! Completion port for the external vision/text model.

/// Image attached to a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// MIME type of `data`.
    pub mime_type: &'static str,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

/// A single instruction, optionally with an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Natural-language instruction.
    pub instruction: String,
    /// Optional image for vision-capable models.
    pub image: Option<ImagePayload>,
}

impl CompletionRequest {
    /// Creates a text-only request.
    #[must_use]
    pub fn text(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            image: None,
        }
    }

    /// Creates a request carrying an image.
    #[must_use]
    pub fn with_image(instruction: impl Into<String>, image: ImagePayload) -> Self {
        Self {
            instruction: instruction.into(),
            image: Some(image),
        }
    }
}

/// Port for the external completion capability.
///
/// Implementations make a single, bounded-time attempt and return the model's
/// free-form text. The text is expected, but not guaranteed, to embed JSON.
pub trait CompletionService: Send + Sync {
    /// Returns a short identifier for logs (e.g. the model name).
    fn name(&self) -> &str;

    /// Sends the request and returns the response text.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or times out.
    fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String>;
}
