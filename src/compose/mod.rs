//! Assembly of generation requests from the user's inputs: prompt
//! precedence, base-image choice and tier lookup.

mod preset;
mod prompt;
mod style;
mod tier;

pub use preset::{Preset, PresetLibrary, Tab, find_prompt};
pub use prompt::{build_wire_prompt, sanitize_prompt};
pub(crate) use prompt::{PLAN_ANALYSIS_INSTRUCTION, enhancement_instruction};
pub use style::ArtStyle;
pub use tier::{
    MODEL_FLASH_IMAGE, MODEL_FLASH_TEXT, MODEL_PRO_IMAGE, ModelTier, Resolution, ResolvedTier,
    is_higher_tier,
};

use crate::mask::MaskSnapshot;
use crate::result::GenerationResult;
use crate::source::SourceImage;

/// Everything the user typed or picked for the next generation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PromptInputs {
    pub prompt: String,
    pub preset_id: Option<String>,
    pub refinement_note: String,
    pub art_style: ArtStyle,
    pub tab: Tab,
    pub tier: ModelTier,
}

impl PromptInputs {
    /// Typed prompt wins over the selected preset's canned prompt
    pub fn effective_prompt(&self, presets: &PresetLibrary) -> Option<String> {
        let typed = self.prompt.trim();
        if !typed.is_empty() {
            return Some(typed.to_owned());
        }
        let id = self.preset_id.as_deref()?;
        presets.find_prompt(self.tab, id).map(str::to_owned)
    }

    pub fn has_refinement_note(&self) -> bool {
        !self.refinement_note.trim().is_empty()
    }

    /// Plan analysis runs only for a fresh plan render
    pub fn wants_plan_analysis(&self, has_result: bool, has_mask: bool) -> bool {
        self.tab == Tab::Plan && !has_result && !has_mask
    }
}

/// Compose the user-facing part of the prompt. Returns `None` when nothing
/// would be sent.
pub fn compose_prompt(
    inputs: &PromptInputs,
    presets: &PresetLibrary,
    plan_context: &str,
) -> Option<String> {
    let mut prompt = String::new();
    if !plan_context.is_empty() {
        prompt.push_str(&format!("[CONTEXT: {}] ", plan_context));
    }

    if let Some(user_prompt) = inputs.effective_prompt(presets) {
        if !prompt.is_empty() {
            prompt.push(' ');
        }
        prompt.push_str(&user_prompt);
    }

    if inputs.has_refinement_note() {
        prompt.push_str(&format!(" \nRefinement Note: {}", inputs.refinement_note));
    }

    if let Some(style) = inputs.art_style.prompt() {
        prompt.push_str(&format!(" \n{}", style));
    }

    if prompt.trim().is_empty() { None } else { Some(prompt) }
}

/// Pick the image the request edits.
///
/// Refinements and masked edits build on the latest result rather than the
/// original upload.
pub fn select_base_image(
    source: Option<&SourceImage>,
    current: Option<&GenerationResult>,
    refinement_note: &str,
    has_mask: bool,
) -> Option<SourceImage> {
    let edits_result = !refinement_note.trim().is_empty() || has_mask;
    if edits_result {
        match current.and_then(GenerationResult::to_source_image) {
            Some(Ok(image)) => return Some(image),
            Some(Err(err)) => log::warn!("Latest result cannot be reused as base image: {}", err),
            None => {}
        }
    }
    source.cloned()
}

/// A fully composed request, ready for dispatch
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub base: SourceImage,
    /// User-facing prompt; the instruction blocks are added at dispatch
    pub prompt: String,
    pub tier: ResolvedTier,
    pub style_reference: Option<SourceImage>,
    pub mask: Option<MaskSnapshot>,
}
