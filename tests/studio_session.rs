mod common;

use std::sync::Arc;

use archviz_studio::compose::{MODEL_FLASH_IMAGE, MODEL_FLASH_TEXT, ModelTier, PresetLibrary, Tab};
use archviz_studio::config::Settings;
use archviz_studio::error::GenerationError;
use archviz_studio::event::{EventHandler, StudioEvent};
use archviz_studio::service::{Part, RemoteError};
use archviz_studio::state::{AppStatus, CREDENTIAL_KEY, MemoryCredentialStore, Studio};
use common::{ScriptedBackend, image_response, request_text, source_image, text_response};
use egui::{Pos2, Rect, Vec2};
use parking_lot::Mutex;

fn settings() -> Settings {
    Settings {
        api_key_env: None,
        ..Settings::default()
    }
}

fn studio_with(store: MemoryCredentialStore) -> Studio<ScriptedBackend> {
    Studio::new(settings(), ScriptedBackend::new(), Box::new(store)).unwrap()
}

fn studio() -> Studio<ScriptedBackend> {
    studio_with(MemoryCredentialStore::with_credential("personal-key"))
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<StudioEvent>>>);

impl EventHandler for Recorder {
    fn handle_event(&mut self, event: &StudioEvent) {
        self.0.lock().push(event.clone());
    }
}

impl Recorder {
    fn statuses(&self) -> Vec<(AppStatus, AppStatus)> {
        self.0
            .lock()
            .iter()
            .filter_map(|e| match e {
                StudioEvent::StatusChanged { old, new } => Some((*old, *new)),
                _ => None,
            })
            .collect()
    }
}

fn presets() -> PresetLibrary {
    serde_json::from_str(
        r#"{
            "exterior": [ { "id": "modern", "label": "Modern", "children": [
                { "id": "villa", "label": "Villa", "prompt": "Minimalist villa at golden hour" }
            ] } ],
            "plan": [ { "id": "iso", "label": "Isometric", "prompt": "3D isometric cutaway of this plan" } ]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_generate_without_source_fails_without_touching_history() {
    let mut studio = studio();
    let recorder = Recorder::default();
    studio.subscribe(Box::new(recorder.clone()));
    studio.set_prompt("a house");

    let err = studio.generate().unwrap_err();

    assert_eq!(err, GenerationError::NoSourceImage);
    assert_eq!(studio.status(), AppStatus::Error);
    assert_eq!(studio.error(), Some(&GenerationError::NoSourceImage));
    assert!(studio.current().is_none());
    assert!(studio.backend().requests().is_empty());
    assert_eq!(
        recorder.statuses(),
        vec![(AppStatus::Idle, AppStatus::Loading), (AppStatus::Loading, AppStatus::Error)]
    );
}

#[test]
fn test_generate_requires_credential() {
    let mut studio = studio_with(MemoryCredentialStore::new());
    studio.load_source_image(source_image(16, 12));
    studio.set_prompt("a house");

    assert_eq!(studio.generate().unwrap_err(), GenerationError::MissingCredential);
    assert!(studio.error().unwrap().offers_credential_reselect());
}

#[test]
fn test_generate_requires_prompt() {
    let mut studio = studio();
    studio.load_source_image(source_image(16, 12));
    assert_eq!(studio.generate().unwrap_err(), GenerationError::EmptyPrompt);
}

#[test]
fn test_selected_preset_supplies_prompt() {
    let mut studio = studio().with_presets(presets());
    studio.backend().push(image_response(16, 12));
    studio.load_source_image(source_image(16, 12));

    // Groups are not selectable
    studio.toggle_preset("modern");
    assert_eq!(studio.inputs().preset_id, None);
    studio.toggle_preset("villa");
    studio.generate().unwrap();

    let text = request_text(&studio.backend().requests()[0]).to_owned();
    assert!(text.contains("USER INSTRUCTION: Minimalist villa at golden hour"));

    // Switching tabs drops the selection
    studio.set_tab(Tab::Interior);
    assert_eq!(studio.inputs().preset_id, None);
}

#[test]
fn test_three_generations_then_undo_undo_redo() {
    let mut studio = studio();
    studio.load_source_image(source_image(16, 12));
    studio.set_prompt("a house");
    for _ in 0..3 {
        studio.backend().push(image_response(16, 12));
    }

    let a = studio.generate().unwrap();
    let b = studio.generate().unwrap();
    let c = studio.generate().unwrap();
    assert!(Arc::ptr_eq(studio.current().unwrap(), &c));

    studio.undo_result().unwrap();
    studio.undo_result().unwrap();
    assert!(Arc::ptr_eq(studio.current().unwrap(), &a));
    assert!(studio.undo_result().is_none());

    studio.redo_result().unwrap();
    assert!(Arc::ptr_eq(studio.current().unwrap(), &b));
    assert!(studio.history().can_redo());

    // No network traffic for history navigation
    assert_eq!(studio.backend().requests().len(), 3);
}

#[test]
fn test_empty_response_leaves_history_unchanged() {
    let mut studio = studio();
    studio.load_source_image(source_image(16, 12));
    studio.set_prompt("a house");
    studio.backend().push(image_response(16, 12));
    let first = studio.generate().unwrap();

    studio.backend().push(Ok(Default::default()));
    let err = studio.generate().unwrap_err();

    assert_eq!(err, GenerationError::EmptyResult);
    assert_eq!(studio.status(), AppStatus::Error);
    assert!(Arc::ptr_eq(studio.current().unwrap(), &first));
    assert!(!studio.history().can_undo());
}

#[test]
fn test_refinement_builds_on_latest_result() {
    let mut studio = studio();
    studio.load_source_image(source_image(16, 12));
    studio.set_prompt("a house");
    studio.backend().push(image_response(20, 10));
    studio.backend().push(image_response(20, 10));

    let first = studio.generate().unwrap();
    studio.set_refinement_note("add a pool");
    studio.generate().unwrap();

    let requests = studio.backend().requests();
    assert!(request_text(&requests[1]).contains("Refinement Note: add a pool"));
    let Part::InlineData { data, .. } = &requests[1].parts[1] else {
        panic!("base image expected as second part");
    };
    assert!(first.image_url().unwrap().ends_with(data.as_str()));
}

#[test]
fn test_masked_generation_sends_mask_and_resets_surface() {
    let mut studio = studio();
    let recorder = Recorder::default();
    studio.subscribe(Box::new(recorder.clone()));
    studio.load_source_image(source_image(40, 30));
    studio.set_prompt("replace the roof with slate");
    studio.set_mask_display_rect(Rect::from_min_size(Pos2::ZERO, Vec2::new(80.0, 60.0)));

    studio.toggle_mask_mode();
    assert!(studio.mask().is_authoring());
    studio.mask_pointer_down(Pos2::new(20.0, 20.0));
    studio.mask_pointer_move(Pos2::new(60.0, 20.0));
    assert!(studio.outbound_mask().is_none());
    studio.mask_pointer_up().unwrap();
    assert_eq!(studio.outbound_mask().unwrap().size(), (40, 30));

    studio.backend().push(image_response(64, 48));
    studio.generate().unwrap();

    let request = &studio.backend().requests()[0];
    assert_eq!(request.parts.len(), 3);
    assert!(request_text(request).contains("INPAINTING"));

    assert!(!studio.mask().is_authoring());
    assert!(studio.outbound_mask().is_none());
    assert_eq!(studio.mask().raster().unwrap().size(), (64, 48));
    assert!(
        recorder
            .0
            .lock()
            .iter()
            .any(|e| matches!(e, StudioEvent::MaskModeChanged { authoring: false }))
    );
}

#[test]
fn test_mask_undo_republishes_previous_mask() {
    let mut studio = studio();
    studio.load_source_image(source_image(40, 30));
    studio.set_mask_display_rect(Rect::from_min_size(Pos2::ZERO, Vec2::new(40.0, 30.0)));
    studio.set_mask_mode(true);

    studio.mask_pointer_down(Pos2::new(5.0, 5.0));
    studio.mask_pointer_up().unwrap();
    let first = studio.outbound_mask().cloned().unwrap();
    studio.mask_pointer_down(Pos2::new(30.0, 20.0));
    studio.mask_pointer_leave().unwrap();
    assert_ne!(studio.outbound_mask(), Some(&first));

    studio.undo_mask().unwrap();
    assert_eq!(studio.outbound_mask(), Some(&first));
    studio.undo_mask().unwrap();
    assert!(studio.outbound_mask().is_none());
}

#[test]
fn test_plan_tab_runs_geometry_analysis_first() {
    let mut studio = studio().with_presets(presets());
    studio.set_tab(Tab::Plan);
    studio.toggle_preset("iso");
    studio.load_source_image(source_image(16, 12));
    studio
        .backend()
        .push(text_response(
            r#"```json {"dimensions_found": ["3000"], "rooms": ["Kitchen"], "scale_summary": "small"} ```"#,
        ));
    studio.backend().push(image_response(16, 12));

    studio.generate().unwrap();

    let models = studio.backend().models();
    assert_eq!(models, vec![MODEL_FLASH_TEXT.to_owned(), MODEL_FLASH_IMAGE.to_owned()]);
    let text = request_text(&studio.backend().requests()[1]).to_owned();
    assert!(
        text.contains("[CONTEXT: PLAN DATA: Dimensions: 3000. Rooms: Kitchen. Context: small.]")
    );
}

#[test]
fn test_failed_plan_analysis_is_swallowed() {
    let mut studio = studio();
    studio.set_tab(Tab::Plan);
    studio.set_prompt("isometric view");
    studio.load_source_image(source_image(16, 12));
    studio.backend().push(Err(RemoteError::with_code(500, "internal")));
    studio.backend().push(image_response(16, 12));

    studio.generate().unwrap();
    let text = request_text(&studio.backend().requests()[1]).to_owned();
    assert!(!text.contains("[CONTEXT:"));
}

#[test]
fn test_pro_tier_with_personal_key_uses_pro_model() {
    let mut studio = studio();
    studio.load_source_image(source_image(16, 12));
    studio.set_prompt("a house");
    studio.set_tier(ModelTier::Ultra);
    studio
        .backend()
        .push(Err(RemoteError::new(None, Some("RESOURCE_EXHAUSTED".into()), "quota")));
    studio.backend().push(image_response(16, 12));

    let result = studio.generate().unwrap();
    assert_eq!(result.model(), MODEL_FLASH_IMAGE);
    assert_eq!(studio.backend().credentials(), vec!["personal-key"; 2]);
}

#[test]
fn test_manual_key_is_persisted_and_cleared() {
    let store = MemoryCredentialStore::new();
    let mut studio = studio_with(store.clone());
    assert!(!studio.has_personal_key());

    studio.set_manual_key("  my-key ").unwrap();
    assert_eq!(store.get(CREDENTIAL_KEY).as_deref(), Some("my-key"));
    assert_eq!(studio.credential(), Some("my-key"));

    studio.set_manual_key("").unwrap();
    assert_eq!(store.get(CREDENTIAL_KEY), None);
    assert_eq!(studio.credential(), None);
}

#[test]
fn test_enhance_prompt_replaces_typed_prompt() {
    let mut studio = studio();
    studio.set_prompt("house by the lake");
    studio.backend().push(text_response("Lakeside timber house, cinematic lighting"));

    let enhanced = studio.enhance_prompt().unwrap();
    assert_eq!(enhanced, "Lakeside timber house, cinematic lighting, 8k, highly detailed");
    assert_eq!(studio.inputs().prompt, enhanced);
}

#[test]
fn test_enhance_prompt_needs_text() {
    let mut studio = studio();
    assert_eq!(studio.enhance_prompt().unwrap_err(), GenerationError::EmptyPrompt);
}

#[test]
fn test_reset_and_new_project() {
    let mut studio = studio();
    studio.load_source_image(source_image(16, 12));
    studio.set_prompt("a house");
    studio.set_tier(ModelTier::Pro);
    studio.backend().push(image_response(16, 12));
    studio.backend().push(image_response(16, 12));
    studio.generate().unwrap();
    studio.generate().unwrap();

    studio.reset_result();
    assert!(studio.current().is_none());
    assert!(!studio.history().can_undo());
    assert_eq!(studio.status(), AppStatus::Idle);
    assert!(studio.source().is_some());

    studio.new_project();
    assert!(studio.source().is_none());
    assert_eq!(studio.inputs().prompt, "");
    assert_eq!(studio.inputs().tab, Tab::Exterior);
    assert_eq!(studio.inputs().tier, ModelTier::Pro);
    assert!(studio.has_personal_key());
}
