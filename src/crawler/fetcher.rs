//! HTTP client construction and single-page fetching

use crate::{CrawlError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A successfully fetched HTML page
#[derive(Debug)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// Builds the shared HTTP client used for pages, robots.txt and the sink.
///
/// Mock servers speak plain HTTP, so `https_only` stays off; politeness and
/// robots enforcement are the crawler's job, not TLS policy.
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;
    Ok(client)
}

/// Fetches a single page body.
///
/// Transport failures map to [`CrawlError::Http`], non-2xx responses to
/// [`CrawlError::Status`]; redirects are followed by the client and the
/// final body is returned.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| CrawlError::Http {
            url: url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| CrawlError::Http {
        url: url.to_string(),
        source: e,
    })?;

    Ok(FetchedPage {
        status: status.as_u16(),
        body,
    })
}
