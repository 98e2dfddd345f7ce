pub mod compose;
pub mod config;
pub mod error;
pub mod event;
pub mod file_config;
pub mod fingerprint;
pub mod history;
pub mod illustration;
pub mod novelty;
pub mod orchestrator;
pub mod providers;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use compose::compose_post_text;
pub use config::AppConfig;
pub use error::{CycleError, HistoryError, ValidationError};
pub use event::{Event, GeneratedEvent, HistoryRecord};
pub use file_config::{load_config, FileConfig};
pub use fingerprint::{fingerprint, Fingerprint};
pub use history::{HistoryStore, JsonHistoryStore};
pub use illustration::IllustrationStore;
pub use novelty::{is_novel, jaccard_similarity, NoveltyGate, Verdict};
pub use orchestrator::{
    CycleDeps, CycleReport, CycleSettings, Orchestrator, Stage, MAX_GENERATION_ATTEMPTS,
};
pub use traits::{EventGenerator, ImageGenerator, PostReceipt, Publisher};
