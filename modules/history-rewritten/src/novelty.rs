//! Novelty gate: exact-fingerprint and token-Jaccard checks against history.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::event::{Event, HistoryRecord};
use crate::fingerprint::Fingerprint;

/// Candidates more similar than this to any past post are rejected.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Outcome of a novelty check. Indices point into the history snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Novel,
    ExactDuplicate { index: usize },
    TooSimilar { index: usize, similarity: f64 },
}

impl Verdict {
    pub fn is_novel(&self) -> bool {
        matches!(self, Verdict::Novel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoveltyGate {
    threshold: f64,
}

impl Default for NoveltyGate {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl NoveltyGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Check `candidate` against one history snapshot. The exact pass covers
    /// the whole snapshot before any similarity is computed, so an exact match
    /// always wins over an earlier near match.
    pub fn check(
        &self,
        candidate: &Event,
        fingerprint: &Fingerprint,
        history: &[HistoryRecord],
    ) -> Verdict {
        if let Some(index) = history.iter().position(|r| &r.fingerprint == fingerprint) {
            info!(index, fingerprint = %fingerprint, "Event rejected: exact hash match");
            return Verdict::ExactDuplicate { index };
        }

        let candidate_tokens =
            token_set(&candidate.title, &candidate.description, &candidate.location);

        for (index, record) in history.iter().enumerate() {
            let record_tokens = token_set(&record.title, &record.description, &record.location);
            let similarity = jaccard_similarity(&candidate_tokens, &record_tokens);

            if similarity > self.threshold {
                info!(
                    index,
                    similarity,
                    threshold = self.threshold,
                    "Event rejected: too similar to an existing post"
                );
                return Verdict::TooSimilar { index, similarity };
            }
        }

        debug!(records = history.len(), "Event passed uniqueness check");
        Verdict::Novel
    }
}

/// Convenience wrapper returning only accept/reject.
pub fn is_novel(candidate: &Event, history: &[HistoryRecord], threshold: f64) -> bool {
    NoveltyGate::new(threshold)
        .check(candidate, &candidate.fingerprint(), history)
        .is_novel()
}

/// Lower-cased, whitespace-split tokens of the three identity fields.
/// Punctuation stays attached to its word.
pub fn token_set(title: &str, description: &str, location: &str) -> HashSet<String> {
    [title, description, location]
        .iter()
        .flat_map(|field| {
            field
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// |A ∩ B| / |A ∪ B|, or 0.0 when both sets are empty.
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}
