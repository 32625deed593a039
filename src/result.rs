use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::source::{SourceImage, SourceImageError};

/// Output of one successful generation call. Never mutated once created.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    id: Uuid,
    image_url: Option<String>,
    text: Option<String>,
    model: String,
}

// Image payloads are summarised, they are large base64 strings
impl std::fmt::Debug for GenerationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationResult")
            .field("id", &self.id)
            .field("image_url_len", &self.image_url.as_ref().map(String::len))
            .field("text", &self.text)
            .field("model", &self.model)
            .finish()
    }
}

// Reference-counted result, shared between the session and the history stacks
pub type ResultRef = Arc<GenerationResult>;

impl GenerationResult {
    pub fn new(image_url: Option<String>, text: Option<String>, model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_url,
            text,
            model: model.into(),
        }
    }

    pub fn new_ref(
        image_url: Option<String>,
        text: Option<String>,
        model: impl Into<String>,
    ) -> ResultRef {
        Arc::new(Self::new(image_url, text, model))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Generated image as a `data:` URI
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The model that actually produced this result
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }

    /// Decode the generated image so it can be used as the base of a follow-up edit.
    pub fn to_source_image(&self) -> Option<Result<SourceImage, SourceImageError>> {
        self.image_url.as_deref().map(SourceImage::from_data_uri)
    }
}
