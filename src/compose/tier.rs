use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MODEL_PRO_IMAGE: &str = "gemini-3-pro-image-preview";
pub const MODEL_FLASH_IMAGE: &str = "gemini-2.5-flash-image";
pub const MODEL_FLASH_TEXT: &str = "gemini-2.5-flash";

/// Output resolution requested from the pro image model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::OneK => "1K",
            Resolution::TwoK => "2K",
            Resolution::FourK => "4K",
        }
    }
}

/// Quality tier picked by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelTier {
    /// Pro-branded entry that always runs on the fast model
    #[default]
    Optimized,
    Standard,
    Pro,
    Ultra,
}

impl ModelTier {
    pub const ALL: [ModelTier; 4] = [
        ModelTier::Optimized,
        ModelTier::Standard,
        ModelTier::Pro,
        ModelTier::Ultra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Optimized => "optimized",
            ModelTier::Standard => "standard",
            ModelTier::Pro => "pro",
            ModelTier::Ultra => "ultra",
        }
    }

    /// Tiers that only run at full quality with a personally entered key
    pub fn requires_personal_key(&self) -> bool {
        matches!(self, ModelTier::Pro | ModelTier::Ultra)
    }

    /// Look up the model and resolution for this tier.
    ///
    /// Without a personal key the pro tiers degrade to the fast model at 1K.
    pub fn resolve(&self, has_personal_key: bool) -> ResolvedTier {
        if self.requires_personal_key() && !has_personal_key {
            return ResolvedTier::flash();
        }
        match self {
            ModelTier::Optimized | ModelTier::Standard => ResolvedTier::flash(),
            ModelTier::Pro => ResolvedTier {
                model: MODEL_PRO_IMAGE,
                resolution: Resolution::TwoK,
            },
            ModelTier::Ultra => ResolvedTier {
                model: MODEL_PRO_IMAGE,
                resolution: Resolution::FourK,
            },
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown tier '{}' (expected optimized, standard, pro or ultra)", s)
            })
    }
}

/// Concrete model and resolution for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTier {
    pub model: &'static str,
    pub resolution: Resolution,
}

impl ResolvedTier {
    pub fn flash() -> Self {
        Self {
            model: MODEL_FLASH_IMAGE,
            resolution: Resolution::OneK,
        }
    }

    /// Resolution is only honoured by the pro model; other models get none
    pub fn image_size(&self) -> Option<Resolution> {
        is_higher_tier(self.model).then_some(self.resolution)
    }
}

/// True for models that get a one-shot fallback to the fast model
pub fn is_higher_tier(model: &str) -> bool {
    model.starts_with("gemini-3-pro")
}
