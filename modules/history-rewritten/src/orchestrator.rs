//! One generate → gate → illustrate → publish → record cycle.
//!
//! Nothing is retried except novelty: a rejected candidate triggers one fresh
//! generation, [`MAX_GENERATION_ATTEMPTS`] in total. A history record is
//! written only after the publisher confirms the post.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, Instrument};
use typed_builder::TypedBuilder;

use crate::compose::compose_post_text;
use crate::error::CycleError;
use crate::event::{Event, HistoryRecord};
use crate::fingerprint::Fingerprint;
use crate::history::HistoryStore;
use crate::illustration::IllustrationStore;
use crate::novelty::{NoveltyGate, Verdict, DEFAULT_SIMILARITY_THRESHOLD};
use crate::traits::{EventGenerator, ImageGenerator, PostReceipt, Publisher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Gate,
    Illustrate,
    Publish,
    Record,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Generate => "generate",
            Stage::Gate => "gate",
            Stage::Illustrate => "illustrate",
            Stage::Publish => "publish",
            Stage::Record => "record",
        };
        f.write_str(name)
    }
}

/// Collaborators for a cycle, injected at construction.
#[derive(Clone, TypedBuilder)]
pub struct CycleDeps {
    pub generator: Arc<dyn EventGenerator>,
    pub illustrator: Arc<dyn ImageGenerator>,
    pub publisher: Arc<dyn Publisher>,
    pub history: Arc<dyn HistoryStore>,
    pub illustrations: IllustrationStore,
}

/// Generations per cycle, including the first. Fixed so one invocation costs
/// at most two text-generation calls.
pub const MAX_GENERATION_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSettings {
    pub similarity_threshold: f64,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// What a successful cycle produced.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub record: HistoryRecord,
    pub receipt: PostReceipt,
    pub image_path: PathBuf,
    /// Generations used to find a novel event.
    pub attempts: u32,
}

pub struct Orchestrator {
    deps: CycleDeps,
    gate: NoveltyGate,
}

impl Orchestrator {
    pub fn new(deps: CycleDeps, settings: CycleSettings) -> Self {
        Self {
            deps,
            gate: NoveltyGate::new(settings.similarity_threshold),
        }
    }

    /// Run one cycle and reduce the outcome to success/failure. Failures are
    /// logged here and go no further.
    pub async fn run(&self) -> bool {
        let span = tracing::info_span!("cycle", threshold = self.gate.threshold());

        async {
            info!("Starting History Rewritten cycle");
            match self.run_cycle().await {
                Ok(report) => {
                    info!(
                        post_id = %report.receipt.id,
                        url = %report.receipt.url,
                        title = %report.record.title,
                        attempts = report.attempts,
                        "Post published successfully"
                    );
                    true
                }
                Err(e) => {
                    error!(stage = %e.stage(), error = %e, "Cycle failed");
                    false
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let (event, fingerprint, attempts) = self.generate_novel_event().await?;

        info!(title = %event.title, "Generating image");
        let image = self
            .deps
            .illustrator
            .generate_image(&event.image_prompt)
            .await
            .map_err(|e| CycleError::collaborator(Stage::Illustrate, e))?;
        let image_path = self
            .deps
            .illustrations
            .save(&event.title, &image, Local::now())
            .map_err(|e| CycleError::collaborator(Stage::Illustrate, e))?;

        info!("Posting to X");
        let text = compose_post_text(&event);
        let receipt = self
            .deps
            .publisher
            .publish(&text, &image)
            .await
            .map_err(|e| CycleError::collaborator(Stage::Publish, e))?;

        let record = HistoryRecord::from_published(&event, &image_path, fingerprint, Local::now());
        self.deps
            .history
            .append_and_save(record.clone())
            .map_err(CycleError::Record)?;

        Ok(CycleReport {
            record,
            receipt,
            image_path,
            attempts,
        })
    }

    /// GENERATE and GATE, regenerating from scratch on rejection.
    async fn generate_novel_event(&self) -> Result<(Event, Fingerprint, u32), CycleError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            info!(attempt, "Generating alternate history event");
            let event = self
                .deps
                .generator
                .generate()
                .await
                .map_err(|e| CycleError::collaborator(Stage::Generate, e))?
                .validate()?;

            let fingerprint = event.fingerprint();
            let history = self.deps.history.load();

            info!(attempt, records = history.len(), "Checking event uniqueness");
            match self.gate.check(&event, &fingerprint, &history) {
                Verdict::Novel => return Ok((event, fingerprint, attempt)),
                Verdict::ExactDuplicate { index } => {
                    info!(attempt, index, title = %event.title, "Candidate duplicates a past post");
                }
                Verdict::TooSimilar { index, similarity } => {
                    info!(
                        attempt,
                        index,
                        similarity,
                        title = %event.title,
                        "Candidate too similar to a past post"
                    );
                }
            }
        }

        Err(CycleError::NoveltyExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }
}
