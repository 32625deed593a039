//! Best-effort helpers that run against the text model. Neither ever
//! fails: errors are logged and a neutral value is returned.

use serde::Deserialize;
use serde_json::Value;

use super::{ContentRequest, GenerationBackend, Part};
use crate::compose::{
    MODEL_FLASH_TEXT, PLAN_ANALYSIS_INSTRUCTION, enhancement_instruction, sanitize_prompt,
};
use crate::source::SourceImage;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlanAnalysis {
    // Items may come back as numbers as well as strings; null means absent
    dimensions_found: Option<Vec<Value>>,
    rooms: Option<Vec<Value>>,
    scale_summary: Option<Value>,
}

/// Extract dimensions and room labels from a floor plan.
///
/// Returns a one-line summary for the prompt context, the raw model text if
/// it is not the expected JSON, or an empty string on any failure.
pub fn analyze_plan_geometry<B: GenerationBackend>(
    backend: &B,
    credential: &str,
    plan: &SourceImage,
) -> String {
    let request = ContentRequest {
        model: MODEL_FLASH_TEXT.to_owned(),
        parts: vec![
            Part::InlineData {
                mime_type: plan.mime().to_owned(),
                data: plan.to_base64(),
            },
            Part::Text(PLAN_ANALYSIS_INSTRUCTION.to_owned()),
        ],
        image_size: None,
    };

    match backend.generate_content(credential, &request) {
        Ok(response) => {
            let analysis = response.first_text().unwrap_or_default();
            log::debug!("Plan analysis result: {}", analysis);
            summarize_plan_analysis(analysis)
        }
        Err(err) => {
            log::error!("Plan analysis failed: {}", err);
            String::new()
        }
    }
}

/// Turn the analysis JSON (optionally wrapped in a code fence) into prompt context
pub fn summarize_plan_analysis(analysis: &str) -> String {
    let json = analysis.replace("```json", "").replace("```", "");
    match serde_json::from_str::<PlanAnalysis>(json.trim()) {
        Ok(data) => format!(
            "PLAN DATA: Dimensions: {}. Rooms: {}. Context: {}.",
            join_or_na(data.dimensions_found.as_deref()),
            join_or_na(data.rooms.as_deref()),
            data.scale_summary
                .as_ref()
                .map(display_value)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "N/A".to_owned()),
        ),
        Err(_) => analysis.to_owned(),
    }
}

fn join_or_na(items: Option<&[Value]>) -> String {
    match items {
        Some(items) if !items.is_empty() => {
            items.iter().map(display_value).collect::<Vec<_>>().join(", ")
        }
        _ => "N/A".to_owned(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Rewrite a prompt with the text model. The rewrite is sanitized; any
/// failure or empty answer returns `original` unchanged.
pub fn enhance_prompt<B: GenerationBackend>(
    backend: &B,
    credential: &str,
    original: &str,
) -> String {
    let request = ContentRequest {
        model: MODEL_FLASH_TEXT.to_owned(),
        parts: vec![Part::Text(enhancement_instruction(original))],
        image_size: None,
    };

    match backend.generate_content(credential, &request) {
        Ok(response) => match response.first_text().map(str::trim) {
            Some(text) if !text.is_empty() => sanitize_prompt(text),
            _ => {
                log::warn!("Prompt enhancement returned no text");
                original.to_owned()
            }
        },
        Err(err) => {
            log::error!("Prompt enhancement failed: {}", err);
            original.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_is_summarized() {
        let raw = "```json\n{\"dimensions_found\": [\"3000\", \"4500\"], \"rooms\": [\"Kitchen\"], \"scale_summary\": \"approx 10m x 15m\"}\n```";
        assert_eq!(
            summarize_plan_analysis(raw),
            "PLAN DATA: Dimensions: 3000, 4500. Rooms: Kitchen. Context: approx 10m x 15m."
        );
    }

    #[test]
    fn missing_fields_read_na() {
        assert_eq!(
            summarize_plan_analysis("{}"),
            "PLAN DATA: Dimensions: N/A. Rooms: N/A. Context: N/A."
        );
    }

    #[test]
    fn numeric_dimensions_are_rendered() {
        let raw = r#"{"dimensions_found":[3000,4.5,"12'6"],"rooms":["Kitchen"],"scale_summary":"10m"}"#;
        assert_eq!(
            summarize_plan_analysis(raw),
            "PLAN DATA: Dimensions: 3000, 4.5, 12'6. Rooms: Kitchen. Context: 10m."
        );
    }

    #[test]
    fn null_fields_read_na() {
        let raw = r#"{"dimensions_found":null,"rooms":null,"scale_summary":null}"#;
        assert_eq!(
            summarize_plan_analysis(raw),
            "PLAN DATA: Dimensions: N/A. Rooms: N/A. Context: N/A."
        );
    }

    #[test]
    fn non_json_is_passed_through() {
        assert_eq!(summarize_plan_analysis("two bedrooms"), "two bedrooms");
    }
}
