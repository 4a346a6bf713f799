use crate::checkpoint::CheckpointStore;
use crate::config::CrawlConfig;
use crate::graph::{EdgeKind, HostEdge, HostGraph, current_timestamp};
use hostmap_crawler::fetcher::Fetch;
use hostmap_crawler::signature::has_ignored_extension;
use hostmap_crawler::{Admission, CrawlState, FetchError, PageFetcher, PageOutcome};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Snapshot of crawl progress, reported after every checkpoint.
#[derive(Debug, Clone)]
pub struct CrawlProgress {
    pub pages_processed: u64,
    pub queue_depth: usize,
    pub domains_seen: usize,
}

/// Callback for reporting checkpoint progress to a front end.
pub type CrawlProgressCallback = Arc<dyn Fn(CrawlProgress) + Send + Sync>;

/// What a finished (or interrupted) run looked like.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub pages_processed: u64,
    pub queue_depth: usize,
    pub domains_seen: usize,
    pub interrupted: bool,
}

/// Orchestrates the crawl: pops frontier URLs, fetches and classifies
/// their references, feeds hyperlinks back into the frontier and
/// cross-host resources into the graph, and checkpoints on a batch
/// cadence.
///
/// One URL is processed at a time, so admission decisions and
/// checkpoints always happen at quiescent points.
pub struct PageProcessor {
    config: CrawlConfig,
    fetcher: PageFetcher,
    graph: HostGraph,
    checkpoints: CheckpointStore,
    state: CrawlState,
    pages_processed: u64,
    progress_callback: Option<CrawlProgressCallback>,
}

impl PageProcessor {
    /// Build a processor, resuming from a checkpoint when one is present
    /// and loadable, otherwise starting fresh from the configured seeds.
    pub fn new(
        config: CrawlConfig,
        graph: HostGraph,
        checkpoints: CheckpointStore,
    ) -> Result<Self, FetchError> {
        let state = checkpoints.load().unwrap_or_else(|| {
            info!("Starting new session from {} seeds", config.seed_urls.len());
            CrawlState::new(&config.seed_urls, config.false_positive_rate)
        });
        let fetcher = PageFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;

        Ok(Self {
            config,
            fetcher,
            graph,
            checkpoints,
            state,
            pages_processed: 0,
            progress_callback: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: CrawlProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn graph(&self) -> &HostGraph {
        &self.graph
    }

    pub fn pages_processed(&self) -> u64 {
        self.pages_processed
    }

    /// Drive the crawl until the frontier is exhausted or the shutdown
    /// flag is raised, then commit and checkpoint unconditionally. Only
    /// graph-store failures abort early, and they still pass through the
    /// final checkpoint.
    pub async fn run(&mut self, shutdown: &AtomicBool) -> Result<CrawlSummary, rusqlite::Error> {
        info!(
            "Crawl starting: {} queued URLs, {} known root domains",
            self.state.queue_len(),
            self.state.domain_count()
        );

        let mut interrupted = false;
        let mut store_failure = None;

        loop {
            if shutdown.load(Ordering::SeqCst) {
                info!("Shutdown requested, stopping after current page");
                interrupted = true;
                break;
            }
            let Some(url) = self.state.next_url() else {
                info!("Frontier exhausted");
                break;
            };

            match self.process_url(&url).await {
                Ok(outcome) => debug!("{} -> {:?}", url, outcome),
                Err(e) => {
                    warn!("Graph store failure while processing {}: {}", url, e);
                    store_failure = Some(e);
                    break;
                }
            }
        }

        self.finalize();

        match store_failure {
            Some(e) => Err(e),
            None => Ok(CrawlSummary {
                pages_processed: self.pages_processed,
                queue_depth: self.state.queue_len(),
                domains_seen: self.state.domain_count(),
                interrupted,
            }),
        }
    }

    /// One crawl step for one URL. Per-page failures collapse into a
    /// terminal [`PageOutcome`] and never propagate; only graph-store
    /// errors (the unrecoverable class) surface as `Err`.
    pub async fn process_url(&mut self, raw_url: &str) -> Result<PageOutcome, rusqlite::Error> {
        if has_ignored_extension(raw_url, &self.config.ignored_extensions) {
            return Ok(PageOutcome::SkippedExtension);
        }

        let url = match Url::parse(raw_url) {
            Ok(url) => url,
            Err(e) => return Ok(PageOutcome::FetchFailed(format!("unparseable URL: {}", e))),
        };
        let Some(source_host) = url.host_str().map(|h| h.to_string()) else {
            return Ok(PageOutcome::FetchFailed("URL has no host".to_string()));
        };

        let page = match self.fetcher.fetch(&url).await {
            Ok(Fetch::Html(page)) => page,
            Ok(Fetch::NonHtml(_)) => return Ok(PageOutcome::NonHtml),
            Ok(Fetch::BadStatus(code)) => {
                return Ok(PageOutcome::FetchFailed(format!("status {}", code)));
            }
            Err(e) => return Ok(PageOutcome::FetchFailed(e.to_string())),
        };

        let source_id = self.graph.get_or_create_host(&source_host)?;

        // Hyperlinks only ever extend the frontier; none of them become
        // edges.
        let mut links_admitted = 0;
        for link in &page.links {
            if has_ignored_extension(link.as_str(), &self.config.ignored_extensions) {
                continue;
            }
            if self.state.admit(link, self.config.max_links_per_root_domain) == Admission::Enqueued
            {
                links_admitted += 1;
            }
        }

        // Cross-host resources are the dependencies being mapped.
        // Same-host embeds say nothing about host relationships.
        let now = current_timestamp();
        let mut edges = Vec::new();
        for resource in &page.resources {
            let Some(target_host) = resource.host_str() else {
                continue;
            };
            if target_host == source_host {
                continue;
            }
            let target_id = self.graph.get_or_create_host(target_host)?;
            edges.push(HostEdge {
                source_id,
                target_id,
                kind: EdgeKind::Resource,
                timestamp: now,
            });
        }

        let edges_recorded = edges.len();
        if !edges.is_empty() {
            self.graph.append_edges(edges);
            self.pages_processed += 1;

            if self.pages_processed % self.config.batch_size as u64 == 0 {
                self.commit_and_checkpoint();
            }
        }

        Ok(PageOutcome::Processed {
            links_admitted,
            edges_recorded,
        })
    }

    /// Batch boundary: flush buffered edges, snapshot the crawl state, and
    /// report progress. Persistence failures are logged and retried at the
    /// next boundary; they never stop the crawl.
    fn commit_and_checkpoint(&mut self) {
        match self.graph.commit() {
            Ok(written) => debug!("Committed {} edges", written),
            Err(e) => warn!("Graph commit failed, will retry next batch: {}", e),
        }
        if let Err(e) = self.checkpoints.save(&self.state) {
            warn!("Checkpoint save failed, will retry next batch: {}", e);
        }

        let progress = CrawlProgress {
            pages_processed: self.pages_processed,
            queue_depth: self.state.queue_len(),
            domains_seen: self.state.domain_count(),
        };
        info!(
            "Processed {} pages. Queue: {}. Domains: {}",
            progress.pages_processed, progress.queue_depth, progress.domains_seen
        );
        if let Some(ref callback) = self.progress_callback {
            callback(progress);
        }
    }

    /// Unconditional commit and checkpoint, run at every exit path so an
    /// interrupt never loses progress.
    pub fn finalize(&mut self) {
        self.commit_and_checkpoint();
    }
}
