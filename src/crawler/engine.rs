//! Crawl engine: worker pool and per-URL pipeline
//!
//! The engine owns the shared pieces (HTTP client, politeness gate,
//! frontier, sink) and runs N worker tasks over the frontier until it
//! quiesces. Each worker repeatedly takes a URL, passes the politeness
//! gate, fetches, extracts, discovers links, and reports the result.
//!
//! `scraper::Html` is not `Send`, so all document work happens inside a
//! synchronous helper; nothing holds the parsed tree across an await.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::extract::{self, StructuredData};
use crate::frontier::Frontier;
use crate::politeness::{Decision, PolitenessGate};
use crate::robots::RobotsPolicyCache;
use crate::scrape::{scrape_page, JobRecord};
use crate::sink::{RecordSink, UpsertRecord};
use crate::url::normalize_url;
use crate::Result;
use chrono::Utc;
use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// How long an idle worker parks between frontier re-checks
const DEQUEUE_TIMEOUT: Duration = Duration::from_millis(200);

/// Everything learned from one fetched page
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub url: String,
    pub json_ld: Vec<Value>,
    pub microdata: Vec<Value>,
    /// Best-effort scraped fields, filled when the page carried no
    /// structured data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobRecord>,
}

/// Outcome of the synchronous document pass
struct ParsedPage {
    data: StructuredData,
    job: Option<JobRecord>,
    links: Vec<Url>,
}

/// The crawl engine; construct once, run once
pub struct CrawlEngine {
    client: reqwest::Client,
    gate: PolitenessGate,
    frontier: Frontier,
    results: Mutex<Vec<CrawlResult>>,
    sink: Arc<dyn RecordSink>,
    workers: usize,
}

impl CrawlEngine {
    /// Builds an engine from configuration, sharing one HTTP client across
    /// page fetches and robots.txt fetches
    pub fn new(config: &Config, sink: Arc<dyn RecordSink>) -> Result<Self> {
        let user_agent = config.user_agent.header_value();
        let client = build_http_client(&user_agent, config.crawler.fetch_timeout())?;

        let robots = RobotsPolicyCache::new(client.clone(), user_agent.clone());
        let gate = PolitenessGate::new(robots, user_agent, config.crawler.default_delay());

        Ok(Self {
            client,
            gate,
            frontier: Frontier::new(config.crawler.max_pages),
            results: Mutex::new(Vec::new()),
            sink,
            workers: config.crawler.workers,
        })
    }

    /// Runs the crawl to completion and returns all results.
    ///
    /// Results are in completion order; with concurrent workers that order
    /// is not deterministic.
    pub async fn run(self: Arc<Self>, seeds: Vec<Url>) -> Vec<CrawlResult> {
        let mut admitted = 0usize;
        for seed in seeds {
            if self.frontier.enqueue(seed) {
                admitted += 1;
            }
        }
        info!(seeds = admitted, workers = self.workers, "Starting crawl");

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let engine = self.clone();
            handles.push(tokio::spawn(async move {
                engine.worker_loop(worker_id).await;
            }));
        }

        for handle in handles {
            // A panicked worker loses its URLs but must not hang the crawl
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker task failed");
            }
        }

        let results = std::mem::take(
            &mut *self.results.lock().unwrap_or_else(|e| e.into_inner()),
        );
        info!(pages = results.len(), "Crawl finished");
        results
    }

    async fn worker_loop(&self, worker_id: usize) {
        debug!(worker_id, "Worker started");
        while let Some(url) = self.frontier.dequeue(DEQUEUE_TIMEOUT).await {
            if let Err(e) = self.process_url(&url).await {
                warn!(url = %url, error = %e, "Page dropped");
            }
            self.frontier.task_done();
        }
        debug!(worker_id, "Worker finished");
    }

    /// Fetches and processes one URL end to end
    async fn process_url(&self, url: &Url) -> Result<()> {
        match self.gate.acquire(url).await {
            Decision::Disallowed => {
                debug!(url = %url, "Skipped by politeness gate");
                return Ok(());
            }
            Decision::Allowed { waited } => {
                if !waited.is_zero() {
                    debug!(url = %url, waited_ms = waited.as_millis() as u64, "Delayed fetch");
                }
            }
        }

        let page = fetch_page(&self.client, url).await?;
        debug!(url = %url, status = page.status, bytes = page.body.len(), "Fetched");

        let parsed = parse_page(&page.body, url);

        for link in parsed.links {
            self.frontier.enqueue(link);
        }

        let record = UpsertRecord {
            url: url.as_str().to_string(),
            json_ld: parsed.data.json_ld.clone(),
            microdata: parsed.data.microdata.clone(),
            scraped_at: Utc::now(),
        };
        if let Err(e) = self.sink.upsert(&record).await {
            // Sink trouble must not stop the crawl
            warn!(url = %url, error = %e, "Sink upsert failed");
        }

        let result = CrawlResult {
            url: url.as_str().to_string(),
            json_ld: parsed.data.json_ld,
            microdata: parsed.data.microdata,
            job: parsed.job,
        };
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(result);

        Ok(())
    }

    /// Number of URLs admitted to the frontier so far
    pub fn visited_len(&self) -> usize {
        self.frontier.visited_len()
    }
}

/// Parses the body and extracts everything in one synchronous pass
fn parse_page(body: &str, url: &Url) -> ParsedPage {
    let document = Html::parse_document(body);

    let data = extract::extract(&document);
    let job = if data.is_empty() {
        Some(scrape_page(&document, url))
    } else {
        None
    };

    let link_selector = Selector::parse("a[href]").expect("valid selector");
    let mut links = Vec::new();
    for anchor in document.select(&link_selector) {
        if let Some(href) = anchor.value().attr("href") {
            if let Some(link) = normalize_url(url, href) {
                links.push(link);
            }
        }
    }

    ParsedPage { data, job, links }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_discovers_links() {
        let base = Url::parse("https://example.com/jobs").unwrap();
        let parsed = parse_page(
            r##"<html><body>
            <a href="/a">A</a>
            <a href="https://other.com/b">B</a>
            <a href="javascript:void(0)">skip</a>
            <a href="#anchor">skip</a>
            </body></html>"##,
            &base,
        );
        let links: Vec<&str> = parsed.links.iter().map(|u| u.as_str()).collect();
        assert_eq!(links, vec!["https://example.com/a", "https://other.com/b"]);
    }

    #[test]
    fn test_parse_page_job_fallback_only_without_structured_data() {
        let base = Url::parse("https://example.com/jobs").unwrap();

        let plain = parse_page(
            "<html><head><title>PM Role</title></head><body>text</body></html>",
            &base,
        );
        assert!(plain.data.is_empty());
        assert_eq!(plain.job.as_ref().unwrap().title, "PM Role");

        let structured = parse_page(
            r#"<html><script type="application/ld+json">{"@type":"JobPosting"}</script></html>"#,
            &base,
        );
        assert!(!structured.data.is_empty());
        assert!(structured.job.is_none());
    }
}
