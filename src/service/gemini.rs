use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use super::{ContentRequest, ContentResponse, GenerationBackend, Part, RemoteError};
use crate::compose::Resolution;
use crate::config::DEFAULT_API_BASE_URL;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the `generateContent` endpoint.
///
/// No local timeout is applied; a request runs until the service answers.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: HttpClient,
    base_url: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = HttpClient::builder().timeout(None).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn with_default_endpoint() -> Result<Self, reqwest::Error> {
        Self::new(DEFAULT_API_BASE_URL)
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

impl GenerationBackend for GeminiClient {
    fn generate_content(
        &self,
        credential: &str,
        request: &ContentRequest,
    ) -> Result<ContentResponse, RemoteError> {
        let endpoint = self.endpoint(&request.model);
        log::debug!("POST {} ({} parts)", endpoint, request.parts.len());

        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, credential)
            .header(CONTENT_TYPE, "application/json")
            .json(&WireRequest::from(request))
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().map_err(transport_error)?;
        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &body));
        }

        let parsed: WireResponse = serde_json::from_str(&body)
            .map_err(|err| {
                let message = format!("Malformed response: {}", err);
                RemoteError::new(Some(status.as_u16()), None, message)
            })?;
        Ok(parsed.into_content())
    }
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    RemoteError::new(err.status().map(|s| s.as_u16()), None, err.to_string())
}

/// Map an error body of the form `{"error": {"code", "message", "status"}}`.
/// Anything else keeps the HTTP status and the raw body as message.
fn parse_error_body(http_status: u16, body: &str) -> RemoteError {
    match serde_json::from_str::<WireErrorEnvelope>(body) {
        Ok(WireErrorEnvelope { error }) => RemoteError::new(
            error.code.or(Some(http_status)),
            error.status,
            error.message.unwrap_or_default(),
        ),
        Err(_) => RemoteError::new(Some(http_status), None, body.trim().to_owned()),
    }
}

// Wire format. Requests borrow from the caller, responses are owned.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    contents: [WireContentOut<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Serialize)]
struct WireContentOut<'a> {
    parts: Vec<WirePartOut<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum WirePartOut<'a> {
    Text(&'a str),
    InlineData {
        #[serde(rename = "mimeType")]
        mime_type: &'a str,
        data: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    image_config: WireImageConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireImageConfig {
    image_size: Resolution,
}

impl<'a> From<&'a ContentRequest> for WireRequest<'a> {
    fn from(request: &'a ContentRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => WirePartOut::Text(text),
                Part::InlineData { mime_type, data } => WirePartOut::InlineData { mime_type, data },
            })
            .collect();
        Self {
            contents: [WireContentOut { parts }],
            generation_config: request.image_size.map(|image_size| WireGenerationConfig {
                image_config: WireImageConfig { image_size },
            }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireResponse {
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireCandidate {
    content: Option<WireContentIn>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireContentIn {
    parts: Vec<WirePartIn>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WirePartIn {
    text: Option<String>,
    inline_data: Option<WireBlob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireBlob {
    mime_type: String,
    data: String,
}

impl WireResponse {
    // Only the first candidate is used
    fn into_content(self) -> ContentResponse {
        let parts = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| match (part.inline_data, part.text) {
                (Some(blob), _) => Some(Part::InlineData {
                    mime_type: blob.mime_type,
                    data: blob.data,
                }),
                (None, Some(text)) => Some(Part::Text(text)),
                (None, None) => None,
            })
            .collect();
        ContentResponse { parts }
    }
}

#[derive(Deserialize)]
struct WireErrorEnvelope {
    error: WireError,
}

#[derive(Deserialize)]
struct WireError {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}
