// Collaborator seams for one publication cycle.
//
// EventGenerator — text model producing a candidate event.
// ImageGenerator — image model rendering the illustration prompt.
// Publisher      — social platform receiving text + image.
//
// Production adapters live in `providers`; in-memory fakes in `testing`.

use anyhow::Result;
use async_trait::async_trait;

use crate::event::GeneratedEvent;

#[async_trait]
pub trait EventGenerator: Send + Sync {
    /// Produce one candidate. Field presence is checked by the caller.
    async fn generate(&self) -> Result<GeneratedEvent>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Render `prompt` and return the encoded image bytes.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `text` with `image` attached. An acknowledgment without a post
    /// id must be returned as an error.
    async fn publish(&self, text: &str, image: &[u8]) -> Result<PostReceipt>;
}

/// Confirmation of a published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub id: String,
    pub url: String,
}
