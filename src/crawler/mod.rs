//! Crawl engine and HTTP fetching

mod engine;
mod fetcher;

pub use engine::{CrawlEngine, CrawlResult};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
