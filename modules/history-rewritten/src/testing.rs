// In-memory fakes for the cycle's collaborator seams.
//
// - MockEventGenerator (EventGenerator) — scripted queue of replies
// - MockImageGenerator (ImageGenerator) — fixed bytes, records prompts
// - MockPublisher (Publisher) — confirming / unconfirmed / failing
// - InMemoryHistoryStore (HistoryStore) — Vec behind a Mutex
//
// No network, no disk beyond the caller's temp dir.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::error::HistoryError;
use crate::event::{Event, GeneratedEvent, HistoryRecord};
use crate::history::HistoryStore;
use crate::traits::{EventGenerator, ImageGenerator, PostReceipt, Publisher};

/// A complete event whose text is derived from `title`.
pub fn sample_event(title: &str) -> Event {
    Event {
        title: title.to_string(),
        description: format!("In a quiet turn, {title} reshapes the century."),
        location: format!("{title} Harbor, Atlantis"),
        date: "April 12, 1912".to_string(),
        image_prompt: format!("prompt for {title}"),
    }
}

/// History record for `event` as if it had been published.
pub fn published_record(event: &Event) -> HistoryRecord {
    HistoryRecord {
        timestamp: "2024-01-01T00:00:00.000000".to_string(),
        title: event.title.clone(),
        date: event.date.clone(),
        location: event.location.clone(),
        description: event.description.clone(),
        image_prompt: event.image_prompt.clone(),
        image_path: format!("generated_images/{}.png", event.title),
        fingerprint: event.fingerprint(),
    }
}

// ---------------------------------------------------------------------------
// MockEventGenerator
// ---------------------------------------------------------------------------

/// Returns scripted replies in order; errors once the script runs out.
pub struct MockEventGenerator {
    replies: Mutex<VecDeque<GeneratedEvent>>,
    calls: AtomicU32,
}

impl MockEventGenerator {
    pub fn new(events: Vec<Event>) -> Self {
        Self::from_raw(events.into_iter().map(GeneratedEvent::from).collect())
    }

    pub fn from_raw(replies: Vec<GeneratedEvent>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventGenerator for MockEventGenerator {
    async fn generate(&self) -> Result<GeneratedEvent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .map_err(|_| anyhow!("MockEventGenerator: lock poisoned"))?
            .pop_front()
            .ok_or_else(|| anyhow!("MockEventGenerator: no scripted reply left"))
    }
}

// ---------------------------------------------------------------------------
// MockImageGenerator
// ---------------------------------------------------------------------------

pub struct MockImageGenerator {
    bytes: Option<Vec<u8>>,
    prompts: Mutex<Vec<String>>,
}

impl MockImageGenerator {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every request fails.
    pub fn failing() -> Self {
        Self {
            bytes: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match &self.bytes {
            Some(bytes) => Ok(bytes.clone()),
            None => bail!("MockImageGenerator: image service unavailable"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockPublisher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PublishBehavior {
    Confirm,
    NoConfirmation,
    Fail,
}

/// Records `(text, image_len)` for every publish call.
pub struct MockPublisher {
    behavior: PublishBehavior,
    posts: Mutex<Vec<(String, usize)>>,
}

impl MockPublisher {
    fn with_behavior(behavior: PublishBehavior) -> Self {
        Self {
            behavior,
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn confirming() -> Self {
        Self::with_behavior(PublishBehavior::Confirm)
    }

    /// The platform accepts the request but returns no post id.
    pub fn unconfirmed() -> Self {
        Self::with_behavior(PublishBehavior::NoConfirmation)
    }

    pub fn failing() -> Self {
        Self::with_behavior(PublishBehavior::Fail)
    }

    pub fn posts(&self) -> Vec<(String, usize)> {
        self.posts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, text: &str, image: &[u8]) -> Result<PostReceipt> {
        match self.behavior {
            PublishBehavior::Fail => bail!("MockPublisher: transport error"),
            PublishBehavior::NoConfirmation => {
                bail!("MockPublisher: post creation returned no data")
            }
            PublishBehavior::Confirm => {
                let mut posts = self
                    .posts
                    .lock()
                    .map_err(|_| anyhow!("MockPublisher: lock poisoned"))?;
                posts.push((text.to_string(), image.len()));
                let id = format!("{}", 1000 + posts.len());
                Ok(PostReceipt {
                    url: format!("https://twitter.com/i/web/status/{id}"),
                    id,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// InMemoryHistoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryHistoryStore {
    records: Mutex<Vec<HistoryRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: &[Event]) -> Self {
        Self {
            records: Mutex::new(events.iter().map(published_record).collect()),
        }
    }

    pub fn records(&self) -> Vec<HistoryRecord> {
        self.load()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn load(&self) -> Vec<HistoryRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn append_and_save(&self, record: HistoryRecord) -> Result<(), HistoryError> {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
        Ok(())
    }
}
