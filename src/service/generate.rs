use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::{ContentRequest, ContentResponse, GenerationBackend, Part};
use crate::compose::{GenerationRequest, MODEL_FLASH_IMAGE, build_wire_prompt, is_higher_tier};
use crate::error::GenerationError;
use crate::result::GenerationResult;

/// Build the wire request: instruction text, base image, then the optional
/// mask and style reference.
pub fn build_content_request(request: &GenerationRequest) -> ContentRequest {
    let mut parts = Vec::with_capacity(4);
    parts.push(Part::Text(build_wire_prompt(
        &request.prompt,
        request.mask.is_some(),
        request.style_reference.is_some(),
    )));
    parts.push(Part::InlineData {
        mime_type: request.base.mime().to_owned(),
        data: request.base.to_base64(),
    });
    if let Some(mask) = &request.mask {
        parts.push(Part::InlineData {
            mime_type: "image/png".to_owned(),
            data: BASE64.encode(mask.png_bytes()),
        });
    }
    if let Some(style) = &request.style_reference {
        parts.push(Part::InlineData {
            mime_type: style.mime().to_owned(),
            data: style.to_base64(),
        });
    }

    ContentRequest {
        model: request.tier.model.to_owned(),
        parts,
        image_size: request.tier.image_size(),
    }
}

/// Run one generation.
///
/// A higher-tier model rejected for quota, permission or capacity reasons is
/// retried exactly once on the fast image model without a resolution. The
/// result records the model that actually answered.
pub fn generate_image<B: GenerationBackend>(
    backend: &B,
    credential: &str,
    request: &GenerationRequest,
) -> Result<GenerationResult, GenerationError> {
    let content = build_content_request(request);
    log::info!(
        "Generating with {} (image size: {:?}, mask: {}, style reference: {})",
        content.model,
        content.image_size,
        request.mask.is_some(),
        request.style_reference.is_some()
    );

    match backend.generate_content(credential, &content) {
        Ok(response) => process_response(response, &content.model),
        Err(err) => {
            let mapped = err.to_generation_error();
            if !(mapped.allows_tier_fallback() && is_higher_tier(&content.model)) {
                log::error!("Generation failed on {}: {}", content.model, err);
                return Err(mapped);
            }

            log::warn!(
                "{} rejected the request ({}), falling back to {}",
                content.model,
                err,
                MODEL_FLASH_IMAGE
            );
            let fallback = ContentRequest {
                model: MODEL_FLASH_IMAGE.to_owned(),
                image_size: None,
                ..content
            };
            match backend.generate_content(credential, &fallback) {
                Ok(response) => process_response(response, &fallback.model),
                Err(err) => {
                    log::error!("Fallback generation failed: {}", err);
                    Err(err.to_generation_error())
                }
            }
        }
    }
}

fn process_response(
    response: ContentResponse,
    model: &str,
) -> Result<GenerationResult, GenerationError> {
    let mut image_url = None;
    let mut text = None;
    for part in response.parts {
        match part {
            Part::InlineData { mime_type, data } => {
                let mime = if mime_type.is_empty() { "image/png".to_owned() } else { mime_type };
                image_url = Some(format!("data:{};base64,{}", mime, data));
            }
            Part::Text(t) if !t.is_empty() => text = Some(t),
            _ => {}
        }
    }

    if image_url.is_none() && text.is_none() {
        log::warn!("{} returned neither image nor text", model);
        return Err(GenerationError::EmptyResult);
    }
    Ok(GenerationResult::new(image_url, text, model))
}
