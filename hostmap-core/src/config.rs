use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_batch_size() -> usize {
    20
}

fn default_max_links_per_root_domain() -> u64 {
    50
}

fn default_fetch_timeout_secs() -> u64 {
    5
}

fn default_false_positive_rate() -> f64 {
    0.001
}

/// File suffixes that are never worth fetching as pages: binaries, media,
/// archives, and style/script/data formats.
pub fn default_ignored_extensions() -> Vec<String> {
    [
        ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".mp3", ".mp4", ".avi", ".mov",
        ".zip", ".rar", ".7z", ".exe", ".iso", ".dmg", ".tar", ".gz", ".css", ".js", ".xml",
        ".json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Operational knobs for one crawl run. Loadable from a JSON file; every
/// field has a default so partial configs work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Where the crawl begins when no checkpoint exists.
    pub seed_urls: Vec<String>,
    /// Graph commits and checkpoints happen every this many processed pages.
    pub batch_size: usize,
    /// Diversity ceiling: admitted frontier links per root domain.
    pub max_links_per_root_domain: u64,
    pub fetch_timeout_secs: u64,
    pub ignored_extensions: Vec<String>,
    /// Membership filter false-positive target.
    pub false_positive_rate: f64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_urls: Vec::new(),
            batch_size: default_batch_size(),
            max_links_per_root_domain: default_max_links_per_root_domain(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            ignored_extensions: default_ignored_extensions(),
            false_positive_rate: default_false_positive_rate(),
        }
    }
}

impl CrawlConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let bytes = fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        serde_json::from_slice(&bytes).map_err(|e| format!("invalid config {}: {}", path.display(), e))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than zero".to_string());
        }
        if self.false_positive_rate <= 0.0 || self.false_positive_rate >= 1.0 {
            return Err(
                "false_positive_rate must be between 0.0 (exclusive) and 1.0 (exclusive)"
                    .to_string(),
            );
        }
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}
