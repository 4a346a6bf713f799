pub mod error;
pub mod fetcher;
pub mod frontier;
pub mod result;
pub mod signature;

pub use error::FetchError;
pub use fetcher::{Fetch, FetchedPage, PageFetcher};
pub use frontier::{Admission, CrawlState};
pub use result::PageOutcome;
