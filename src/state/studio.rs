use egui::{Color32, Pos2, Rect};
use std::sync::Arc;

use crate::compose::{
    ArtStyle, GenerationRequest, ModelTier, PresetLibrary, PromptInputs, Tab, compose_prompt,
    select_base_image,
};
use crate::config::{ConfigError, Settings};
use crate::error::GenerationError;
use crate::event::{EventBus, EventHandler, StudioEvent, SubscriptionId};
use crate::history::ResultHistory;
use crate::mask::{MaskError, MaskSnapshot, MaskSurface, MaskUpdate};
use crate::result::ResultRef;
use crate::service::{GenerationBackend, analyze_plan_geometry, enhance_prompt, generate_image};
use crate::source::SourceImage;
use crate::state::persistence::{CredentialStore, PersistenceResult};
use crate::state::AppStatus;

/// One editing session: the uploaded image, prompt inputs, the displayed
/// result with its undo/redo history, and the in-painting mask.
///
/// Every operation runs to completion inside the call and announces its
/// effect on the event bus.
pub struct Studio<B: GenerationBackend> {
    settings: Settings,
    backend: B,
    credentials: Box<dyn CredentialStore>,
    /// Personally entered key; unlocks the pro tiers
    manual_key: Option<String>,
    /// Key from the environment, used when no personal key is set
    env_key: Option<String>,

    status: AppStatus,
    error: Option<GenerationError>,

    source: Option<SourceImage>,
    style_reference: Option<SourceImage>,
    current: Option<ResultRef>,
    history: ResultHistory,

    mask: MaskSurface,
    /// Mask that goes out with the next request
    outbound_mask: Option<MaskSnapshot>,

    inputs: PromptInputs,
    presets: PresetLibrary,
    event_bus: EventBus,
}

impl<B: GenerationBackend> std::fmt::Debug for Studio<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("status", &self.status)
            .field("error", &self.error)
            .field("has_personal_key", &self.manual_key.is_some())
            .field("source", &self.source)
            .field("current", &self.current)
            .field("past", &self.history.past().len())
            .field("future", &self.history.future_len())
            .field("mask_authoring", &self.mask.is_authoring())
            .field("inputs", &self.inputs)
            .finish()
    }
}

impl<B: GenerationBackend> Studio<B> {
    pub fn new(
        settings: Settings,
        backend: B,
        credentials: Box<dyn CredentialStore>,
    ) -> Result<Self, ConfigError> {
        let brush = settings.brush()?;

        let manual_key = match credentials.load() {
            Ok(key) => key,
            Err(err) => {
                log::warn!("Could not load stored credential: {}", err);
                None
            }
        };
        let env_key = settings
            .api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty());

        log::info!(
            "Studio ready (personal key: {}, environment key: {})",
            manual_key.is_some(),
            env_key.is_some()
        );

        let inputs = PromptInputs {
            tier: settings.default_tier,
            art_style: settings.default_art_style,
            ..PromptInputs::default()
        };

        Ok(Self {
            settings,
            backend,
            credentials,
            manual_key,
            env_key,
            status: AppStatus::Idle,
            error: None,
            source: None,
            style_reference: None,
            current: None,
            history: ResultHistory::new(),
            mask: MaskSurface::new(brush),
            outbound_mask: None,
            inputs,
            presets: PresetLibrary::default(),
            event_bus: EventBus::new(),
        })
    }

    pub fn with_presets(mut self, presets: PresetLibrary) -> Self {
        self.presets = presets;
        self
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) -> SubscriptionId {
        self.event_bus.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.event_bus.unsubscribe(id)
    }

    // --- Generation ---

    /// Compose and dispatch a generation request for the current inputs.
    ///
    /// On success the result becomes current (the previous one moves into
    /// history), the status is `Success` and mask authoring ends. On failure
    /// the error is stored, the status is `Error` and history is untouched.
    pub fn generate(&mut self) -> Result<ResultRef, GenerationError> {
        if self.status.is_pending() {
            log::warn!("Generate requested while a request is pending");
            return Err(GenerationError::Busy);
        }
        self.set_status(AppStatus::Loading);
        self.error = None;

        match self.run_generation() {
            Ok(result) => {
                self.history.record_and_replace(&mut self.current, result.clone());
                log::info!("Generation succeeded with {} ({})", result.model(), result.id());
                self.set_status(AppStatus::Success);
                self.event_bus.emit(StudioEvent::ResultChanged {
                    result: Some(result.clone()),
                });
                self.emit_history();
                self.end_mask_session();
                Ok(result)
            }
            Err(err) => {
                self.error = Some(err.clone());
                self.set_status(AppStatus::Error);
                self.event_bus.emit(StudioEvent::GenerationFailed(err.clone()));
                Err(err)
            }
        }
    }

    fn run_generation(&self) -> Result<ResultRef, GenerationError> {
        let credential = self.credential().ok_or(GenerationError::MissingCredential)?;
        let has_mask = self.outbound_mask.is_some();

        let base = select_base_image(
            self.source.as_ref(),
            self.current.as_deref(),
            &self.inputs.refinement_note,
            has_mask,
        )
        .ok_or(GenerationError::NoSourceImage)?;

        let plan_context = if self.inputs.wants_plan_analysis(self.current.is_some(), has_mask) {
            analyze_plan_geometry(&self.backend, credential, &base)
        } else {
            String::new()
        };

        let prompt = compose_prompt(&self.inputs, &self.presets, &plan_context)
            .ok_or(GenerationError::EmptyPrompt)?;

        let request = GenerationRequest {
            base,
            prompt,
            tier: self.inputs.tier.resolve(self.has_personal_key()),
            style_reference: self.style_reference.clone(),
            mask: self.outbound_mask.clone(),
        };
        let result = generate_image(&self.backend, credential, &request)?;
        Ok(Arc::new(result))
    }

    /// Rewrite the typed prompt (or the selected preset's prompt) with the
    /// text model and make it the typed prompt.
    pub fn enhance_prompt(&mut self) -> Result<String, GenerationError> {
        let text = self
            .inputs
            .effective_prompt(&self.presets)
            .ok_or(GenerationError::EmptyPrompt)?;
        let credential = self.credential().ok_or(GenerationError::MissingCredential)?;

        let enhanced = enhance_prompt(&self.backend, credential, &text);
        self.inputs.prompt = enhanced.clone();
        self.event_bus.emit(StudioEvent::PromptEnhanced {
            prompt: enhanced.clone(),
        });
        Ok(enhanced)
    }

    // --- Result history ---

    pub fn undo_result(&mut self) -> Option<ResultRef> {
        let shown = self.history.undo(&mut self.current)?;
        log::debug!("Undo to result {}", shown.id());
        self.result_navigated();
        Some(shown)
    }

    pub fn redo_result(&mut self) -> Option<ResultRef> {
        let shown = self.history.redo(&mut self.current)?;
        log::debug!("Redo to result {}", shown.id());
        self.result_navigated();
        Some(shown)
    }

    fn result_navigated(&mut self) {
        self.event_bus.emit(StudioEvent::ResultChanged {
            result: self.current.clone(),
        });
        self.emit_history();
        self.end_mask_session();
    }

    /// Drop the displayed result and its history, back to the source image
    pub fn reset_result(&mut self) {
        self.current = None;
        self.history.clear();
        self.error = None;
        self.set_status(AppStatus::Idle);
        self.event_bus.emit(StudioEvent::ResultChanged { result: None });
        self.emit_history();
        self.end_mask_session();
    }

    /// Start over: images, inputs, results and mask are all discarded.
    /// The stored credential and the chosen tier are kept.
    pub fn new_project(&mut self) {
        log::info!("Starting new project");
        let tier = self.inputs.tier;
        self.inputs = PromptInputs {
            tier,
            art_style: self.settings.default_art_style,
            ..PromptInputs::default()
        };
        self.source = None;
        self.style_reference = None;
        self.current = None;
        self.history.clear();
        self.error = None;
        self.set_status(AppStatus::Idle);

        let was_authoring = self.mask.is_authoring();
        self.mask = MaskSurface::new(self.settings.brush().unwrap_or_default());
        self.outbound_mask = None;
        if was_authoring {
            self.event_bus.emit(StudioEvent::MaskModeChanged { authoring: false });
        }

        self.event_bus.emit(StudioEvent::ProjectReset);
    }

    // --- Images ---

    /// Replace the uploaded image. The mask is reset to the new image size.
    pub fn load_source_image(&mut self, image: SourceImage) {
        log::info!("Source image loaded: {:?}", image);
        let dimensions = image.dimensions();
        self.source = Some(image);
        self.event_bus.emit(StudioEvent::SourceChanged { dimensions });
        self.end_mask_session();
    }

    pub fn set_style_reference(&mut self, image: Option<SourceImage>) {
        self.style_reference = image;
    }

    // --- Prompt inputs ---

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.inputs.prompt = prompt.into();
    }

    pub fn set_refinement_note(&mut self, note: impl Into<String>) {
        self.inputs.refinement_note = note.into();
    }

    /// Select a preset; selecting the selected one again deselects it.
    /// Groups cannot be selected.
    pub fn toggle_preset(&mut self, id: &str) {
        if self.inputs.preset_id.as_deref() == Some(id) {
            self.inputs.preset_id = None;
        } else if self.presets.find_prompt(self.inputs.tab, id).is_some() {
            self.inputs.preset_id = Some(id.to_owned());
        } else {
            log::debug!("Preset '{}' is not selectable on the {} tab", id, self.inputs.tab);
        }
    }

    /// Switch tabs; the preset selection does not carry over
    pub fn set_tab(&mut self, tab: Tab) {
        if self.inputs.tab != tab {
            self.inputs.tab = tab;
            self.inputs.preset_id = None;
        }
    }

    pub fn set_art_style(&mut self, style: ArtStyle) {
        self.inputs.art_style = style;
    }

    pub fn set_tier(&mut self, tier: ModelTier) {
        if tier.requires_personal_key() && !self.has_personal_key() {
            log::info!("{} tier runs on the standard model until a personal key is set", tier);
        }
        self.inputs.tier = tier;
    }

    // --- Credentials ---

    /// Store a personal key, or remove it when `key` is blank
    pub fn set_manual_key(&mut self, key: &str) -> PersistenceResult<()> {
        let key = key.trim();
        if key.is_empty() {
            self.credentials.clear()?;
            self.manual_key = None;
        } else {
            self.credentials.save(key)?;
            self.manual_key = Some(key.to_owned());
        }
        self.event_bus.emit(StudioEvent::CredentialChanged {
            present: self.manual_key.is_some(),
        });
        Ok(())
    }

    pub fn has_personal_key(&self) -> bool {
        self.manual_key.is_some()
    }

    /// The key requests are sent with; the personal key wins
    pub fn credential(&self) -> Option<&str> {
        self.manual_key.as_deref().or(self.env_key.as_deref())
    }

    // --- Mask ---

    pub fn set_mask_mode(&mut self, authoring: bool) {
        if self.mask.is_authoring() == authoring {
            return;
        }
        if authoring && self.mask.raster().is_none() {
            self.mask.attach(self.displayed_dimensions());
        }
        let update = self.mask.set_authoring(authoring);
        self.event_bus.emit(StudioEvent::MaskModeChanged { authoring });
        if let Some(update) = update {
            self.publish_mask(update);
        }
    }

    pub fn toggle_mask_mode(&mut self) {
        self.set_mask_mode(!self.mask.is_authoring());
    }

    pub fn set_mask_display_rect(&mut self, rect: Rect) {
        self.mask.set_display_rect(rect);
    }

    pub fn mask_pointer_down(&mut self, pos: Pos2) {
        self.mask.pointer_down(pos);
    }

    pub fn mask_pointer_move(&mut self, pos: Pos2) {
        self.mask.pointer_move(pos);
    }

    pub fn mask_pointer_up(&mut self) -> Result<(), MaskError> {
        if let Some(update) = self.mask.pointer_up()? {
            self.publish_mask(update);
        }
        Ok(())
    }

    pub fn mask_pointer_leave(&mut self) -> Result<(), MaskError> {
        if let Some(update) = self.mask.pointer_leave()? {
            self.publish_mask(update);
        }
        Ok(())
    }

    pub fn undo_mask(&mut self) -> Result<(), MaskError> {
        if let Some(update) = self.mask.undo()? {
            self.publish_mask(update);
        }
        Ok(())
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.mask.set_brush_size(size);
    }

    pub fn set_brush_color(&mut self, color: Color32) {
        self.mask.set_brush_color(color);
    }

    fn publish_mask(&mut self, update: MaskUpdate) {
        self.outbound_mask = update.mask().cloned();
        self.event_bus.emit(StudioEvent::MaskChanged(update));
    }

    /// Leave authoring and resize the raster for whatever is now displayed
    fn end_mask_session(&mut self) {
        let was_authoring = self.mask.is_authoring();
        let had_mask = self.outbound_mask.take().is_some();
        self.mask.attach(self.displayed_dimensions());
        if was_authoring {
            self.event_bus.emit(StudioEvent::MaskModeChanged { authoring: false });
        }
        if had_mask {
            self.event_bus.emit(StudioEvent::MaskChanged(MaskUpdate::Cleared));
        }
    }

    /// Natural size of the image on screen: the current result, else the upload
    fn displayed_dimensions(&self) -> Option<(u32, u32)> {
        if let Some(result) = &self.current {
            match result.to_source_image() {
                Some(Ok(image)) => return image.dimensions(),
                Some(Err(err)) => {
                    log::warn!("Displayed result cannot be decoded: {}", err);
                    return None;
                }
                None => {}
            }
        }
        self.source.as_ref().and_then(SourceImage::dimensions)
    }

    // --- Status ---

    fn set_status(&mut self, new: AppStatus) {
        let old = self.status;
        if old == new {
            return;
        }
        if !old.can_transition_to(new) {
            log::warn!("Ignoring status transition {:?} -> {:?}", old, new);
            return;
        }
        self.status = new;
        self.event_bus.emit(StudioEvent::StatusChanged { old, new });
    }

    fn emit_history(&self) {
        self.event_bus.emit(StudioEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    // --- Accessors ---

    pub fn status(&self) -> AppStatus {
        self.status
    }

    pub fn error(&self) -> Option<&GenerationError> {
        self.error.as_ref()
    }

    pub fn current(&self) -> Option<&ResultRef> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &ResultHistory {
        &self.history
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn style_reference(&self) -> Option<&SourceImage> {
        self.style_reference.as_ref()
    }

    pub fn mask(&self) -> &MaskSurface {
        &self.mask
    }

    pub fn outbound_mask(&self) -> Option<&MaskSnapshot> {
        self.outbound_mask.as_ref()
    }

    pub fn inputs(&self) -> &PromptInputs {
        &self.inputs
    }

    pub fn presets(&self) -> &PresetLibrary {
        &self.presets
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
