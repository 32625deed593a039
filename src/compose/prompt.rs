//! Prompt text sent on the wire: the fixed instruction blocks and the
//! clean-up applied to user-written prompts.

const SYSTEM_INSTRUCTION: &str = "\
You are an advanced AI Architecture Visualizer & Photographer.
Your mission is to generate or enhance architectural images with \"Architectural Digest\" quality.

CORE DIRECTIVES:
1.  **Photorealism**: Achieve 8k resolution, perfect exposure, and high dynamic range (unless a specific artistic style is requested).
2.  **Physical Accuracy**: Adhere to PBR (Physically Based Rendering) rules. Materials must look tangible (e.g., concrete porosity, wood grain, glass reflections).
3.  **Lighting & Atmosphere**: Simulate realistic global illumination, soft shadows, and specific environmental contexts (e.g., Golden Hour, Blue Hour, Overcast/Misty, Harsh Desert Sun).
4.  **Perspective**: Maintain structural integrity. Use 2-point perspective for exteriors and wide-angle for interiors.
5.  **Biomes & Landscape**: Accurately render vegetation and terrain suitable for the requested location (e.g., Arid Desert, Lush Tropical, Pine Forest).

STRICT RULES:
- If the input is a sketch: Convert it to a photorealistic render (unless prompted for a specific artistic style).
- If the input is a photo: Enhance details, lighting, and materials based on the prompt.
- If a mask is provided: MODIFY ONLY the masked area. Blend edges seamlessly.
";

const INPAINT_DIRECTIVE: &str = "
[CRITICAL TASK: HARD MATERIAL REPLACEMENT / INPAINTING]

INPUT DATA:
- IMAGE 1: The Base Image.
- IMAGE 2: The Selection Mask (contains colored brush strokes).

STRICT EXECUTION STEPS:
1. **IDENTIFY ZONE**: The colored brush strokes in Image 2 define the \"Edit Zone\".
2. **HARD CLIPPING**: This is a hard selection. Do not paint outside the lines.
3. **PIXEL-PERFECT ALIGNMENT**: The mask is 1:1 aligned with the Base Image. (0,0) matches (0,0).
4. **IGNORE MASK COLOR**: The color of the mask is irrelevant. DO NOT blend this color into the output.
5. **DELETE & REPLACE**: Inside the \"Edit Zone\", completely replace the original texture/object.
6. **APPLY NEW MATERIAL**: Fill the \"Edit Zone\" with the material described in the USER INSTRUCTION.
7. **MATCH PHYSICS**: The new material must match the lighting, perspective, and shadows of the Base Image.
";

const STYLE_TRANSFER_DIRECTIVE: &str = "
[TASK: STYLE TRANSFER]
- A Style Reference image is provided.
- ACTION: Analyze the reference image for Lighting, Color Palette, and Material Mood.
- APPLY: Apply these aesthetic qualities to the main generated image.
";

pub(crate) const DEFAULT_INSTRUCTION: &str = "Enhance this architecture, realistic.";

pub(crate) const PLAN_ANALYSIS_INSTRUCTION: &str = "
Analyze this architectural floor plan image STRICTLY.

YOUR TASK:
1. **OCR (Text Reading)**: Identify all numerical dimensions (e.g., \"3000\", \"4.5m\", \"12'6\") and room labels. Translate non-English labels to English.
2. **Geometry Analysis**: Estimate the aspect ratio and primary scale based on the numbers found.
3. **Validation**: Double-check the numbers. Do not hallucinate.

OUTPUT FORMAT (JSON):
{
  \"dimensions_found\": [\"3000\", \"4500\"],
  \"rooms\": [\"Bedroom\", \"Kitchen\"],
  \"scale_summary\": \"Rectangular layout approx 10m x 15m\",
  \"aspect_ratio_description\": \"Wide rectangle\"
}

Return ONLY the JSON.
";

/// Instruction for the prompt rewriting model
pub(crate) fn enhancement_instruction(original: &str) -> String {
    format!(
        "Act as a Senior Prompt Engineer for Architecture AI.
Refine the following user input into a concise, professional prompt.

User Input: \"{original}\"

Requirements:
- If input is non-English, TRANSLATE it to English architectural keywords first.
- Focus on architectural terms (Facade, Materiality, Lighting).
- Add keywords for quality (8k, photorealistic, cinematic lighting).
- Keep it under 60 words.

Output ONLY the enhanced prompt."
    )
}

const CGI_TERMS: [&str; 3] = ["render", "3d model", "cgi"];

/// Steer the model towards a photographic look: CGI vocabulary becomes
/// "photograph" (whole words, any case) and quality keywords are appended.
pub fn sanitize_prompt(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut out = replace_words(input, &CGI_TERMS, "photograph");
    out.push_str(", 8k, highly detailed");
    out
}

/// Full text part of a generation request
pub fn build_wire_prompt(user_prompt: &str, has_mask: bool, has_style_reference: bool) -> String {
    let instruction = if user_prompt.trim().is_empty() {
        DEFAULT_INSTRUCTION
    } else {
        user_prompt
    };

    let mut prompt = format!(
        "{}\n---\nUSER INSTRUCTION: {}\n---\n",
        SYSTEM_INSTRUCTION,
        sanitize_prompt(instruction)
    );
    if has_mask {
        prompt.push_str(INPAINT_DIRECTIVE);
    }
    if has_style_reference {
        prompt.push_str(STYLE_TRANSFER_DIRECTIVE);
    }
    prompt
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn matches_word_at(bytes: &[u8], at: usize, needle: &str) -> bool {
    let end = at + needle.len();
    end <= bytes.len()
        && bytes[at..end].eq_ignore_ascii_case(needle.as_bytes())
        && (end == bytes.len() || !is_word_byte(bytes[end]))
}

/// Replace ASCII needles that stand as whole words
fn replace_words(input: &str, needles: &[&str], replacement: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let at_boundary = i == 0 || !is_word_byte(bytes[i - 1]);
        if at_boundary {
            if let Some(needle) = needles.iter().find(|n| matches_word_at(bytes, i, n)) {
                out.push_str(replacement);
                i += needle.len();
                continue;
            }
        }
        match input[i..].chars().next() {
            Some(ch) => {
                out.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_whole_words_only() {
        assert_eq!(
            sanitize_prompt("A Render of a 3D model, CGI look, renders"),
            "A photograph of a photograph, photograph look, renders, 8k, highly detailed"
        );
    }

    #[test]
    fn sanitize_keeps_non_ascii_text() {
        assert_eq!(
            sanitize_prompt("บ้าน render"),
            "บ้าน photograph, 8k, highly detailed"
        );
    }

    #[test]
    fn sanitize_empty_stays_empty() {
        assert_eq!(sanitize_prompt(""), "");
    }

    #[test]
    fn wire_prompt_includes_directives_on_demand() {
        let plain = build_wire_prompt("modern villa", false, false);
        assert!(plain.contains("USER INSTRUCTION: modern villa, 8k, highly detailed"));
        assert!(!plain.contains("INPAINTING"));

        let masked = build_wire_prompt("", true, true);
        assert!(masked.contains(DEFAULT_INSTRUCTION.trim_end_matches('.')));
        assert!(masked.contains("INPAINTING"));
        assert!(masked.contains("STYLE TRANSFER"));
    }
}
