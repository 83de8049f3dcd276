//! Session-long robots.txt cache
//!
//! Each domain's robots.txt is fetched at most once per crawl session. The
//! cache map is guarded by a std mutex that is never held across I/O; each
//! entry is a `OnceCell` so that concurrent misses for the same domain
//! collapse into a single fetch.

use crate::robots::RobotsPolicy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Caches one `RobotsPolicy` per domain for the lifetime of a crawl session
pub struct RobotsPolicyCache {
    client: reqwest::Client,
    user_agent: String,
    entries: Mutex<HashMap<String, Arc<OnceCell<Arc<RobotsPolicy>>>>>,
}

impl RobotsPolicyCache {
    /// Creates a new cache using the given HTTP client for robots fetches
    pub fn new(client: reqwest::Client, user_agent: String) -> Self {
        Self {
            client,
            user_agent,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached policy for a domain, fetching it on first use.
    ///
    /// Fetch failures and non-2xx responses degrade to the fail-open policy,
    /// and that outcome is cached too: a domain without a reachable
    /// robots.txt is not re-probed every page.
    pub async fn get_or_fetch(&self, domain: &str) -> Arc<RobotsPolicy> {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries
                .entry(domain.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        cell.get_or_init(|| self.fetch_policy(domain))
            .await
            .clone()
    }

    async fn fetch_policy(&self, domain: &str) -> Arc<RobotsPolicy> {
        let robots_url = format!("http://{}/robots.txt", domain);
        debug!(domain = %domain, url = %robots_url, "Fetching robots.txt");

        let response = match self
            .client
            .get(&robots_url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(domain = %domain, error = %e, "robots.txt fetch failed, allowing all");
                return Arc::new(RobotsPolicy::allow_all());
            }
        };

        if !response.status().is_success() {
            debug!(
                domain = %domain,
                status = response.status().as_u16(),
                "No robots.txt, allowing all"
            );
            return Arc::new(RobotsPolicy::allow_all());
        }

        match response.text().await {
            Ok(body) => Arc::new(RobotsPolicy::from_content(&body)),
            Err(e) => {
                warn!(domain = %domain, error = %e, "robots.txt body unreadable, allowing all");
                Arc::new(RobotsPolicy::allow_all())
            }
        }
    }

    /// Number of domains with a cache entry (fetched or in flight)
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
