use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendering style keyword appended to the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtStyle {
    #[default]
    Photo,
    Oil,
    Pencil,
    Marker,
    ColorPencil,
    Anime,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 6] = [
        ArtStyle::Photo,
        ArtStyle::Oil,
        ArtStyle::Pencil,
        ArtStyle::Marker,
        ArtStyle::ColorPencil,
        ArtStyle::Anime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtStyle::Photo => "photo",
            ArtStyle::Oil => "oil",
            ArtStyle::Pencil => "pencil",
            ArtStyle::Marker => "marker",
            ArtStyle::ColorPencil => "color-pencil",
            ArtStyle::Anime => "anime",
        }
    }

    /// Prompt fragment for this style; photorealistic adds nothing
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            ArtStyle::Photo => None,
            ArtStyle::Oil => Some("Style: Oil Painting on Canvas, textured brushwork, artistic masterpiece."),
            ArtStyle::Pencil => Some("Style: Graphite Pencil Sketch on paper, monochrome, hand-drawn, hatching details."),
            ArtStyle::Marker => Some("Style: Architectural Marker Rendering, alcohol marker style, vibrant colors, hand-drawn."),
            ArtStyle::ColorPencil => Some("Style: Colored Pencil Drawing, soft shading, artistic hand-drawn texture."),
            ArtStyle::Anime => Some("Style: Anime Art, vibrant colors, detailed background, Makoto Shinkai style, high resolution."),
        }
    }
}

impl fmt::Display for ArtStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown art style '{}'", s))
    }
}
