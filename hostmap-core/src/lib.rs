pub mod checkpoint;
pub mod config;
pub mod crawl;
pub mod graph;

pub use checkpoint::{CheckpointError, CheckpointStore};
pub use config::CrawlConfig;
pub use crawl::{CrawlProgress, CrawlProgressCallback, CrawlSummary, PageProcessor};
pub use graph::{EdgeKind, HostEdge, HostGraph};

pub fn print_banner() {
    println!(
        r#"
  _                _
 | |__   ___  ___| |_ _ __ ___   __ _ _ __
 | '_ \ / _ \/ __| __| '_ ` _ \ / _` | '_ \
 | | | | (_) \__ \ |_| | | | | | (_| | |_) |
 |_| |_|\___/|___/\__|_| |_| |_|\__,_| .__/
                                     |_|
 mapping who depends on whom, one page at a time
"#
    );
}
