mod client;
pub(crate) mod types;

use tracing::info;

use crate::error::{AiError, Result};
use client::OpenAiClient;

pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

// =============================================================================
// OpenAi
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    pub(crate) model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            temperature: None,
            max_tokens: None,
            base_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key, self.http.clone());
        match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        }
    }

    /// Single-turn completion with only a user message.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = self.request().message(types::WireMessage::user(prompt));
        self.send(request).await
    }

    /// Render one image for `request` and return the raw bytes.
    pub async fn generate_image(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        let wire = types::ImageGenerationRequest {
            model: &request.model,
            prompt: &request.prompt,
            size: &request.size,
            quality: &request.quality,
            n: 1,
        };

        let bytes = self.client().generate_image(&wire).await?;
        info!(model = %request.model, bytes = bytes.len(), "Image generated");
        Ok(bytes)
    }

    fn request(&self) -> types::ChatRequest {
        let mut request = types::ChatRequest::new(&self.model);

        if types::uses_max_completion_tokens(&self.model) {
            if let Some(limit) = self.max_tokens {
                request = request.max_completion_tokens(limit);
            }
            return request;
        }

        if let Some(limit) = self.max_tokens {
            request = request.max_tokens(limit);
        }
        if let Some(temperature) = self.temperature {
            request = request.temperature(temperature);
        }
        request
    }

    async fn send(&self, request: types::ChatRequest) -> Result<String> {
        let response = self.client().chat(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(AiError::EmptyResponse("no completion from OpenAI"))
    }
}

// =============================================================================
// ImageRequest
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub quality: String,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_IMAGE_MODEL.to_string(),
            prompt: prompt.into(),
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_new() {
        let ai = OpenAi::new("sk-test", "gpt-4o");
        assert_eq!(ai.model(), "gpt-4o");
        assert_eq!(ai.api_key, "sk-test");
        assert!(ai.base_url.is_none());
    }

    #[test]
    fn chat_request_carries_sampling_options() {
        let ai = OpenAi::new("sk-test", "gpt-4o")
            .with_temperature(0.8)
            .with_max_tokens(500);
        let request = ai.request();
        assert_eq!(request.temperature, Some(0.8));
        assert_eq!(request.max_tokens, Some(500));
        assert_eq!(request.max_completion_tokens, None);
    }

    #[test]
    fn reasoning_model_drops_temperature() {
        let ai = OpenAi::new("sk-test", "o3-mini")
            .with_temperature(0.8)
            .with_max_tokens(500);
        let request = ai.request();
        assert_eq!(request.temperature, None);
        assert_eq!(request.max_tokens, None);
        assert_eq!(request.max_completion_tokens, Some(500));
    }

    #[test]
    fn image_request_defaults() {
        let request = ImageRequest::new("a harbor at dawn");
        assert_eq!(request.model, "dall-e-3");
        assert_eq!(request.size, "1024x1024");
        assert_eq!(request.quality, "standard");

        let custom = request.size("1792x1024").quality("hd");
        assert_eq!(custom.size, "1792x1024");
        assert_eq!(custom.quality, "hd");
    }
}
