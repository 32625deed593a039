use thiserror::Error;

/// Errors that abort a generation request and are surfaced to the user.
///
/// Auxiliary failures (plan analysis, prompt enhancement) never become a
/// `GenerationError`; they are logged and swallowed where they happen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("API key is missing. Enter a personal key or configure the environment.")]
    MissingCredential,

    #[error("Rate limit exceeded. Try the standard tier or check your API key quota.")]
    QuotaExceeded,

    #[error("Permission denied. Your API key does not have access to this model (or is invalid).")]
    PermissionDenied,

    #[error("Service overloaded. Try again shortly.")]
    Overloaded,

    #[error("No image generated. The model might have blocked the request due to safety filters.")]
    EmptyResult,

    #[error("Please upload an image first.")]
    NoSourceImage,

    #[error("Please enter a prompt or select a style preset.")]
    EmptyPrompt,

    #[error("A generation request is already in progress.")]
    Busy,

    #[error("{0}")]
    Remote(String),
}

impl GenerationError {
    /// True when the caller should offer the user to pick another credential.
    pub fn offers_credential_reselect(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::MissingCredential)
    }

    /// Remote rejections that allow a retry on a lower-tier model.
    pub fn allows_tier_fallback(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded | Self::PermissionDenied | Self::Overloaded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_only_for_remote_capacity_errors() {
        assert!(GenerationError::QuotaExceeded.allows_tier_fallback());
        assert!(GenerationError::Overloaded.allows_tier_fallback());
        assert!(GenerationError::PermissionDenied.allows_tier_fallback());
        assert!(!GenerationError::EmptyResult.allows_tier_fallback());
        assert!(!GenerationError::Remote("boom".into()).allows_tier_fallback());
    }

    #[test]
    fn empty_result_mentions_safety_filters() {
        assert!(GenerationError::EmptyResult.to_string().contains("safety filters"));
    }
}
