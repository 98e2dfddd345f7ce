//! Production collaborators backed by OpenAI and X.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use ai_client::{strip_code_blocks, ImageRequest, OpenAi};
use x_client::XClient;

use crate::event::GeneratedEvent;
use crate::traits::{EventGenerator, ImageGenerator, PostReceipt, Publisher};

pub const EVENT_PROMPT: &str = r#"Generate a compelling alternate history event that never actually happened but feels plausible.

Requirements:
- Include a specific date (month, day, year) between 1850-1990
- Include a specific location (city, country)
- Create a brief, engaging description suitable for social media
- Keep the description under 240 characters to leave room for date/location
- Make it feel historically authentic but clearly fictional
- Focus on significant but believable alternate outcomes

Return your response in this exact JSON format:
{
    "date": "Month DD, YYYY",
    "location": "City, Country",
    "title": "Brief compelling title",
    "description": "Short engaging description under 200 characters",
    "image_prompt": "black and white photographic realism with light grain, slightly aged paper texture, depicting [describe the scene in detail]"
}

Examples of good alternate history events:
- Failed assassination attempts that succeeded
- Different outcomes of famous meetings
- Alternate technology developments
- Different exploration discoveries
- Alternate political alliances"#;

/// Parse a model reply into a [`GeneratedEvent`], tolerating a code fence.
pub fn parse_event_reply(reply: &str) -> Result<GeneratedEvent> {
    let json = strip_code_blocks(reply);
    serde_json::from_str(json).with_context(|| format!("Model reply is not event JSON: {json}"))
}

// ---------------------------------------------------------------------------
// OpenAiEventGenerator
// ---------------------------------------------------------------------------

pub struct OpenAiEventGenerator {
    ai: OpenAi,
}

impl OpenAiEventGenerator {
    pub fn new(ai: OpenAi) -> Self {
        Self { ai }
    }
}

#[async_trait]
impl EventGenerator for OpenAiEventGenerator {
    async fn generate(&self) -> Result<GeneratedEvent> {
        let reply = self
            .ai
            .complete(EVENT_PROMPT)
            .await
            .context("Event generation request failed")?;
        let event = parse_event_reply(&reply)?;

        info!(
            model = self.ai.model(),
            title = event.title.as_deref().unwrap_or("<missing>"),
            "Generated event"
        );
        Ok(event)
    }
}

// ---------------------------------------------------------------------------
// OpenAiIllustrator
// ---------------------------------------------------------------------------

pub struct OpenAiIllustrator {
    ai: OpenAi,
    template: ImageRequest,
}

impl OpenAiIllustrator {
    /// `template` carries model, size and quality; its prompt is replaced per call.
    pub fn new(ai: OpenAi, template: ImageRequest) -> Self {
        Self { ai, template }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiIllustrator {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let request = ImageRequest {
            prompt: prompt.to_string(),
            ..self.template.clone()
        };
        Ok(self
            .ai
            .generate_image(&request)
            .await
            .context("Image generation failed")?)
    }
}

// ---------------------------------------------------------------------------
// XPublisher
// ---------------------------------------------------------------------------

pub struct XPublisher {
    client: XClient,
}

impl XPublisher {
    pub fn new(client: XClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Publisher for XPublisher {
    async fn publish(&self, text: &str, image: &[u8]) -> Result<PostReceipt> {
        let post = self
            .client
            .post_with_image(text, image, "illustration.png")
            .await
            .context("Posting to X failed")?;

        Ok(PostReceipt {
            url: post.url(),
            id: post.id,
        })
    }
}
