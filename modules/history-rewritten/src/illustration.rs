//! Local storage for generated illustrations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use tracing::info;

pub const DEFAULT_IMAGES_DIR: &str = "generated_images";
const MAX_TITLE_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct IllustrationStore {
    dir: PathBuf,
}

impl IllustrationStore {
    /// Open (and create if needed) the image directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create image directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` as `<YYYYmmdd_HHMMSS>_<title>.png`, adding a numeric
    /// suffix when that name is already taken.
    pub fn save<Tz>(&self, title: &str, bytes: &[u8], at: DateTime<Tz>) -> Result<PathBuf>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let stem = format!("{}_{}", at.format("%Y%m%d_%H%M%S"), sanitize_title(title));

        let mut path = self.dir.join(format!("{stem}.png"));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{stem}-{n}.png"));
            n += 1;
        }

        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write image: {}", path.display()))?;

        info!(path = %path.display(), bytes = bytes.len(), "Image saved");
        Ok(path)
    }
}

/// Alphanumerics, spaces and underscores only; trailing whitespace trimmed,
/// spaces become underscores, at most 50 chars.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    kept.trim_end()
        .replace(' ', "_")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect()
}
