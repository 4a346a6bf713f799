use crate::signature::{page_signature, root_domain};
use growable_bloom_filter::GrowableBloom;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use url::Url;

/// Target false-positive rate for the membership filter. A skipped-but-unseen
/// page is acceptable; a re-admitted signature is not.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.001;

/// Initial filter sizing; the filter grows on its own as the crawl does.
const FILTER_INITIAL_CAPACITY: usize = 100_000;

/// Why a candidate hyperlink was or was not admitted to the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Passed every check; now at the queue tail.
    Enqueued,
    /// No resolvable host or registrable root domain.
    NoHost,
    /// The root domain already hit its link ceiling.
    QuotaExceeded,
    /// The signature is (probably) already known.
    AlreadySeen,
}

/// The checkpointable crawl state: FIFO frontier queue, membership filter
/// over page signatures, and per-root-domain admission counters.
///
/// All three pieces mutate together inside [`CrawlState::admit`], so a page
/// scan can never enqueue the same signature twice or overshoot a quota.
#[derive(Serialize, Deserialize)]
pub struct CrawlState {
    queue: VecDeque<String>,
    seen: GrowableBloom,
    quotas: HashMap<String, u64>,
}

impl CrawlState {
    /// Fresh state from the seed list. Seeds go straight into the queue
    /// without marking the filter; their signatures are only consumed once
    /// some page links back to them.
    pub fn new(seeds: &[String], false_positive_rate: f64) -> Self {
        Self {
            queue: seeds.iter().cloned().collect(),
            seen: GrowableBloom::new(false_positive_rate, FILTER_INITIAL_CAPACITY),
            quotas: HashMap::new(),
        }
    }

    /// Reassemble state from checkpointed parts.
    pub fn from_parts(
        queue: VecDeque<String>,
        seen: GrowableBloom,
        quotas: HashMap<String, u64>,
    ) -> Self {
        Self { queue, seen, quotas }
    }

    /// Strict FIFO pop. `None` means the crawl is done.
    pub fn next_url(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// One atomic admission decision for a candidate hyperlink, checked in
    /// fixed order: resolvable root domain, then quota, then signature.
    /// On success the filter, queue and counter are all updated before
    /// returning.
    pub fn admit(&mut self, url: &Url, max_links_per_root_domain: u64) -> Admission {
        let Some(host) = url.host_str() else {
            return Admission::NoHost;
        };
        let Some(root) = root_domain(host) else {
            return Admission::NoHost;
        };

        if self.quotas.get(&root).copied().unwrap_or(0) >= max_links_per_root_domain {
            return Admission::QuotaExceeded;
        }

        let Some(sig) = page_signature(url) else {
            return Admission::NoHost;
        };
        if self.seen.contains(&sig) {
            return Admission::AlreadySeen;
        }

        self.seen.insert(&sig);
        self.queue.push_back(url.as_str().to_string());
        *self.quotas.entry(root).or_insert(0) += 1;
        Admission::Enqueued
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of distinct root domains that have admitted at least one link.
    pub fn domain_count(&self) -> usize {
        self.quotas.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn queue(&self) -> &VecDeque<String> {
        &self.queue
    }

    pub fn seen(&self) -> &GrowableBloom {
        &self.seen
    }

    pub fn quotas(&self) -> &HashMap<String, u64> {
        &self.quotas
    }
}
