//! Boundary to the remote generative API.
//!
//! [`GenerationBackend`] is the only seam; [`GeminiClient`] is the HTTP
//! implementation and tests substitute a scripted backend.

mod analysis;
mod gemini;
mod generate;

pub use analysis::{analyze_plan_geometry, enhance_prompt, summarize_plan_analysis};
pub use gemini::GeminiClient;
pub use generate::{build_content_request, generate_image};

use thiserror::Error;

use crate::compose::Resolution;
use crate::error::GenerationError;

/// One piece of request or response content
#[derive(Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Base64 payload with its mime type
    InlineData { mime_type: String, data: String },
}

impl std::fmt::Debug for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Part::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Part::InlineData { mime_type, data } => f
                .debug_struct("InlineData")
                .field("mime_type", mime_type)
                .field("data_len", &data.len())
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub model: String,
    pub parts: Vec<Part>,
    /// Only sent to models that understand it
    pub image_size: Option<Resolution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentResponse {
    pub parts: Vec<Part>,
}

impl ContentResponse {
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            Part::Text(text) => Some(text.as_str()),
            Part::InlineData { .. } => None,
        })
    }
}

/// Failure reported by the remote service or the transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    /// Numeric status (HTTP or payload `code`)
    pub code: Option<u16>,
    /// Symbolic status such as `RESOURCE_EXHAUSTED`
    pub status: Option<String>,
    pub message: String,
}

/// Remote failure categories that get their own user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Quota,
    Permission,
    Overloaded,
    Other,
}

impl RemoteError {
    pub fn new(code: Option<u16>, status: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            status,
            message: message.into(),
        }
    }

    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self::new(Some(code), None, message)
    }

    /// Categorise the failure.
    ///
    /// Structured codes are authoritative. The message text is only scanned
    /// when the payload carried no code or status at all.
    pub fn classify(&self) -> FailureKind {
        match (self.code, self.status.as_deref()) {
            (Some(429), _) | (_, Some("RESOURCE_EXHAUSTED")) => FailureKind::Quota,
            (Some(403), _) | (_, Some("PERMISSION_DENIED")) => FailureKind::Permission,
            (Some(503), _) | (_, Some("UNAVAILABLE")) => FailureKind::Overloaded,
            (None, None) => classify_message(&self.message),
            _ => FailureKind::Other,
        }
    }

    pub fn to_generation_error(&self) -> GenerationError {
        match self.classify() {
            FailureKind::Quota => GenerationError::QuotaExceeded,
            FailureKind::Permission => GenerationError::PermissionDenied,
            FailureKind::Overloaded => GenerationError::Overloaded,
            FailureKind::Other if self.message.trim().is_empty() => {
                GenerationError::Remote("An unexpected error occurred.".to_owned())
            }
            FailureKind::Other => GenerationError::Remote(self.message.clone()),
        }
    }
}

// Best effort for payloads without structure
fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_ascii_lowercase();
    if lower.contains("429") || lower.contains("quota") || lower.contains("resource_exhausted") {
        FailureKind::Quota
    } else if lower.contains("403") || lower.contains("permission") {
        FailureKind::Permission
    } else if lower.contains("503")
        || lower.contains("overloaded")
        || lower.contains("unavailable")
    {
        FailureKind::Overloaded
    } else {
        FailureKind::Other
    }
}

/// The remote generative API
pub trait GenerationBackend {
    fn generate_content(
        &self,
        credential: &str,
        request: &ContentRequest,
    ) -> Result<ContentResponse, RemoteError>;
}

impl<B: GenerationBackend + ?Sized> GenerationBackend for &B {
    fn generate_content(
        &self,
        credential: &str,
        request: &ContentRequest,
    ) -> Result<ContentResponse, RemoteError> {
        (**self).generate_content(credential, request)
    }
}
