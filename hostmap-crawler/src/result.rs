use serde::{Deserialize, Serialize};

/// Terminal state of one frontier URL. Every pop from the queue ends in
/// exactly one of these; nothing is retried or re-enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageOutcome {
    /// The URL matched an ignored file extension; no fetch was attempted.
    SkippedExtension,
    /// Network error, timeout or non-200 status. The URL is dropped.
    FetchFailed(String),
    /// The response was not HTML; nothing to extract.
    NonHtml,
    /// The page was fetched and its references classified.
    Processed {
        /// Hyperlinks that passed all admission checks.
        links_admitted: usize,
        /// Cross-host resource edges buffered for the graph store.
        edges_recorded: usize,
    },
}

impl PageOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, PageOutcome::Processed { .. })
    }
}
