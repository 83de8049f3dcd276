//! Per-domain politeness enforcement
//!
//! The gate is the single entry point a worker must pass before fetching a
//! page: it answers "is this URL allowed?" and, if so, sleeps out the
//! remaining per-domain delay. The wait and the last-fetch update happen
//! under one per-domain lock, so two workers can never promise the same
//! slot to the same domain. Different domains never block each other.

use crate::robots::RobotsPolicyCache;
use crate::url::extract_domain;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use url::Url;

/// Politeness tracking state for a single domain
#[derive(Debug, Default)]
pub struct DomainState {
    /// When the last request to this domain was made
    last_fetch: Option<Instant>,
}

impl DomainState {
    /// Time remaining until the next request is allowed, zero if ready
    pub fn time_until_next(&self, delay: Duration, now: Instant) -> Duration {
        match self.last_fetch {
            Some(last) => {
                let elapsed = now.duration_since(last);
                delay.saturating_sub(elapsed)
            }
            None => Duration::ZERO,
        }
    }

    /// Records that a request is being made now
    pub fn record_fetch(&mut self, now: Instant) {
        self.last_fetch = Some(now);
    }
}

/// Outcome of asking the gate for permission to fetch a URL
#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    /// Fetch may proceed; `waited` is how long the caller was held back
    Allowed { waited: Duration },
    /// robots.txt disallows this URL for our user agent
    Disallowed,
}

/// Gatekeeper combining robots.txt rules with per-domain request spacing
pub struct PolitenessGate {
    robots: RobotsPolicyCache,
    user_agent: String,
    default_delay: Duration,
    domains: Mutex<HashMap<String, Arc<tokio::sync::Mutex<DomainState>>>>,
}

impl PolitenessGate {
    pub fn new(robots: RobotsPolicyCache, user_agent: String, default_delay: Duration) -> Self {
        Self {
            robots,
            user_agent,
            default_delay,
            domains: Mutex::new(HashMap::new()),
        }
    }

    /// Asks permission to fetch a URL, sleeping out any remaining delay.
    ///
    /// On return with [`Decision::Allowed`] the caller should issue the
    /// fetch immediately: the domain's last-fetch timestamp has already
    /// been stamped.
    pub async fn acquire(&self, url: &Url) -> Decision {
        let Some(domain) = extract_domain(url) else {
            // A URL with no host can't be fetched politely or otherwise
            return Decision::Disallowed;
        };

        let policy = self.robots.get_or_fetch(&domain).await;

        if !policy.is_allowed(url.as_str(), &self.user_agent) {
            debug!(url = %url, "Disallowed by robots.txt");
            return Decision::Disallowed;
        }

        let delay = policy
            .crawl_delay(&self.user_agent)
            .unwrap_or(self.default_delay);

        let state = {
            let mut domains = self.domains.lock().unwrap_or_else(|e| e.into_inner());
            domains
                .entry(domain.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(DomainState::default())))
                .clone()
        };

        // Wait and stamp under the per-domain lock so concurrent workers
        // queue up behind each other for the same domain
        let mut state = state.lock().await;
        let wait = state.time_until_next(delay, Instant::now());
        if !wait.is_zero() {
            trace!(domain = %domain, wait_ms = wait.as_millis() as u64, "Honoring crawl delay");
            tokio::time::sleep(wait).await;
        }
        state.record_fetch(Instant::now());

        Decision::Allowed { waited: wait }
    }
}
