//! Gemini-style backend: prompt plus image references in a JSON payload,
//! base64-encoded image bytes nested inside the response envelope.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use super::{build_prompt, GenerationBackend, GenerationError, REQUEST_TIMEOUT};
use crate::dialogue::{GenerationRequest, PhotoRef};
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.5-flash-image";

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Override the API host, mainly for pointing tests at a local server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generate?key={}",
            self.base_url, MODEL, self.api_key
        )
    }

    fn payload(&self, request: &GenerationRequest) -> Value {
        json!({
            "prompt": { "text": build_prompt(request) },
            "images": [
                image_part(&request.first_photo),
                image_part(&request.second_photo),
            ],
        })
    }
}

fn image_part(photo: &PhotoRef) -> Value {
    match photo {
        PhotoRef::Url(url) => json!({ "image_url": url }),
        PhotoRef::Bytes(bytes) => json!({
            "inline_data": {
                "mime_type": "image/jpeg",
                "data": base64::engine::general_purpose::STANDARD.encode(bytes),
            }
        }),
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        info!(backend = "gemini", "Sending generation request");

        let response = self
            .client
            .post(self.endpoint())
            .timeout(REQUEST_TIMEOUT)
            .json(&self.payload(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Generation request rejected");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Received generation envelope");
        let envelope: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| GenerationError::Decode(e.to_string()))?;
        extract_image(&envelope)
    }
}

// Typed view of the provider envelope; the image lives at
// candidates[_].content.parts[_].inline_data.data.

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(rename = "inline_data", alias = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

fn extract_image(envelope: &GenerateResponse) -> Result<Vec<u8>, GenerationError> {
    let encoded = envelope
        .candidates
        .iter()
        .flat_map(|c| c.content.parts.iter())
        .find_map(|p| p.inline_data.as_ref())
        .map(|d| d.data.as_str())
        .ok_or(GenerationError::EmptyImage)?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| GenerationError::Decode(format!("invalid base64 image data: {e}")))?;

    if bytes.is_empty() {
        return Err(GenerationError::EmptyImage);
    }
    Ok(bytes)
}
