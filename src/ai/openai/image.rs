use super::client::OpenAiHttpClient;
use super::types::{ImageGenerationRequest, ImageGenerationResponse};
use crate::ai::{GeneratedImage, ImageGenerationService};
use crate::Result;
use async_trait::async_trait;

const IMAGE_SIZE: &str = "1024x1024";

pub struct OpenAiImageClient {
    http: OpenAiHttpClient,
}

impl OpenAiImageClient {
    pub fn new(api_key: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new(api_key, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ImageGenerationService for OpenAiImageClient {
    async fn generate_image(&self, prompt: &str, model: &str) -> Result<GeneratedImage> {
        let request = ImageGenerationRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            n: 1,
            size: IMAGE_SIZE.to_string(),
        };

        let response: ImageGenerationResponse =
            self.http.post("/v1/images/generations", &request).await?;

        // Inline base64 payloads are not kept; history only holds URLs.
        let url = response.data.into_iter().next().and_then(|image| image.url);

        if url.is_none() {
            tracing::warn!("OpenAI image response contained no image URL for model {}", model);
        }

        Ok(GeneratedImage {
            id: response.id,
            url,
        })
    }
}
