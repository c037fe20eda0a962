//! Generation gateway: turns a completed [`GenerationRequest`] into exactly
//! one call to an external image-generation service.
//!
//! Two wire shapes exist in the wild, so the backend is a trait with one
//! adapter per shape:
//! - [`gemini::GeminiBackend`]: JSON payload, base64 image inside a JSON
//!   envelope.
//! - [`huggingface::HuggingFaceBackend`]: binary multipart upload, raw image
//!   bytes back.
//!
//! No retry, no backoff: each call is independent and a failure is reported
//! to the user as-is.

pub mod gemini;
pub mod huggingface;

pub use gemini::GeminiBackend;
pub use huggingface::HuggingFaceBackend;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::dialogue::{GenerationRequest, PhotoRef};

/// Bound on the single outbound call; the hosted models routinely take over
/// a minute to answer.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(100);

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation service returned status {status}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response envelope: {0}")]
    Decode(String),
    #[error("response contained no image data")]
    EmptyImage,
}

/// A pluggable image-generation service. One request in, image bytes out.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError>;
}

/// Natural-language description of the requested children, shared by the
/// prompt-driven backends.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let ages = request
        .ages
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Generate a realistic photo of this couple's future children. \
         Children: {}, girls: {}, boys: {}, ages: {}. \
         Use the two attached parent photos as the likeness reference.",
        request.child_count, request.girls, request.boys, ages
    )
}

/// Resolves a photo reference to raw bytes, fetching URL references over HTTP.
pub(crate) async fn fetch_photo_bytes(
    client: &reqwest::Client,
    photo: &PhotoRef,
) -> Result<Vec<u8>, GenerationError> {
    match photo {
        PhotoRef::Bytes(bytes) => Ok(bytes.clone()),
        PhotoRef::Url(url) => {
            let response = client.get(url).timeout(REQUEST_TIMEOUT).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(GenerationError::Status {
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }
            Ok(response.bytes().await?.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::PhotoRef;

    #[test]
    fn prompt_embeds_all_parameters() {
        let request = GenerationRequest {
            first_photo: PhotoRef::Url("https://files.example/a".into()),
            second_photo: PhotoRef::Url("https://files.example/b".into()),
            child_count: 2,
            girls: 1,
            boys: 1,
            ages: vec![5, 10],
        };

        let prompt = build_prompt(&request);
        assert!(prompt.contains("Children: 2"));
        assert!(prompt.contains("girls: 1"));
        assert!(prompt.contains("boys: 1"));
        assert!(prompt.contains("ages: 5, 10"));
    }
}
