//! HuggingFace-style backend: bearer-authorized multipart upload of the two
//! parent photos, raw image bytes in a successful response body.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{error, info};

use super::{fetch_photo_bytes, GenerationBackend, GenerationError, REQUEST_TIMEOUT};
use crate::dialogue::GenerationRequest;
use async_trait::async_trait;

const DEFAULT_MODEL_URL: &str = "https://api-inference.huggingface.co/models/leonelhs/FaceFusion";

pub struct HuggingFaceBackend {
    client: Client,
    api_token: String,
    model_url: String,
}

impl HuggingFaceBackend {
    pub fn new(api_token: String) -> Self {
        Self::with_model_url(api_token, DEFAULT_MODEL_URL.to_string())
    }

    pub fn with_model_url(api_token: String, model_url: String) -> Self {
        Self {
            client: Client::new(),
            api_token,
            model_url,
        }
    }
}

#[async_trait]
impl GenerationBackend for HuggingFaceBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        // This model takes the two faces directly; there is no prompt field.
        let first = fetch_photo_bytes(&self.client, &request.first_photo).await?;
        let second = fetch_photo_bytes(&self.client, &request.second_photo).await?;

        let form = Form::new()
            .part("image1", Part::bytes(first).file_name("parent1.jpg"))
            .part("image2", Part::bytes(second).file_name("parent2.jpg"));

        info!(backend = "huggingface", "Sending generation request");

        let response = self
            .client
            .post(&self.model_url)
            .bearer_auth(&self.api_token)
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
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

        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(GenerationError::EmptyImage);
        }
        Ok(bytes)
    }
}
