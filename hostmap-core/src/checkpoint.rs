use growable_bloom_filter::GrowableBloom;
use hostmap_crawler::CrawlState;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const FRONTIER_FILE: &str = "frontier.json";
const SEEN_FILE: &str = "seen_filter.json";
const QUOTAS_FILE: &str = "quotas.json";

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable snapshots of the crawl state under one directory: the ordered
/// frontier, the serialized membership filter, and the domain quota map.
/// Each file is written to a temp name and renamed into place so a crash
/// mid-save never leaves a half-written snapshot behind.
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist all three pieces of the crawl state.
    pub fn save(&self, state: &CrawlState) -> Result<(), CheckpointError> {
        fs::create_dir_all(&self.dir)?;

        self.write_file(FRONTIER_FILE, state.queue())?;
        self.write_file(SEEN_FILE, state.seen())?;
        self.write_file(QUOTAS_FILE, state.quotas())?;

        Ok(())
    }

    /// Reconstitute crawl progress from a prior save. All three files must
    /// exist and parse; anything missing or corrupt discards the partial
    /// state and yields `None`, so the caller falls back to a fresh start.
    pub fn load(&self) -> Option<CrawlState> {
        if !self.dir.join(FRONTIER_FILE).exists() {
            return None;
        }

        let queue: VecDeque<String> = match self.read_file(FRONTIER_FILE) {
            Ok(queue) => queue,
            Err(e) => {
                warn!("Discarding checkpoint, frontier unreadable: {}", e);
                return None;
            }
        };
        let seen: GrowableBloom = match self.read_file(SEEN_FILE) {
            Ok(seen) => seen,
            Err(e) => {
                warn!("Discarding checkpoint, membership filter unreadable: {}", e);
                return None;
            }
        };
        let quotas: HashMap<String, u64> = match self.read_file(QUOTAS_FILE) {
            Ok(quotas) => quotas,
            Err(e) => {
                warn!("Discarding checkpoint, quota map unreadable: {}", e);
                return None;
            }
        };

        info!(
            "Resuming session: {} queued URLs, {} root domains",
            queue.len(),
            quotas.len()
        );
        Some(CrawlState::from_parts(queue, seen, quotas))
    }

    fn write_file<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<(), CheckpointError> {
        let target = self.dir.join(name);
        let tmp = self.dir.join(format!("{}.tmp", name));
        fs::write(&tmp, serde_json::to_vec(value)?)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn read_file<T: DeserializeOwned>(&self, name: &str) -> Result<T, CheckpointError> {
        let bytes = fs::read(self.dir.join(name))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
