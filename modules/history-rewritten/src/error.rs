//! Error taxonomy for one publication cycle.

use std::path::PathBuf;

use thiserror::Error;

use crate::orchestrator::Stage;

/// The generated event is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("generated event is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// History log I/O and parse failures.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history log I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log exists but is not a valid record array.
    #[error("history log at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize history log: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Why a cycle ended in FAIL.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no novel event after {attempts} generation attempts")]
    NoveltyExhausted { attempts: u32 },

    /// A generation, illustration or publish call failed.
    #[error("{stage} failed: {source:#}")]
    Collaborator {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to record published event: {0}")]
    Record(#[source] HistoryError),
}

impl CycleError {
    pub fn collaborator(stage: Stage, source: impl Into<anyhow::Error>) -> Self {
        CycleError::Collaborator {
            stage,
            source: source.into(),
        }
    }

    /// The stage the cycle stopped in.
    pub fn stage(&self) -> Stage {
        match self {
            CycleError::Validation(_) => Stage::Generate,
            CycleError::NoveltyExhausted { .. } => Stage::Gate,
            CycleError::Collaborator { stage, .. } => *stage,
            CycleError::Record(_) => Stage::Record,
        }
    }
}
