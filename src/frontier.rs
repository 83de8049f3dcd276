//! Shared crawl frontier: dedup set, work queue, page budget, termination
//!
//! The frontier is the single authority on which URLs get fetched. A URL is
//! charged against the page budget at admission time (when it enters the
//! visited set), not at fetch time, so with budget N exactly N URLs are ever
//! handed to workers.
//!
//! Termination is quiescence-based: `dequeue` returns `None` only when the
//! queue is empty and either the stop signal is set or no sibling worker is
//! still holding a URL. A worker that found the queue momentarily empty
//! while another worker is mid-page keeps waiting, because that page may
//! discover new links.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;
use url::Url;

#[derive(Debug, Default)]
struct Inner {
    visited: HashSet<String>,
    queue: VecDeque<Url>,
    /// URLs dequeued but not yet reported done
    in_flight: usize,
}

/// Thread-safe crawl frontier shared by all workers
pub struct Frontier {
    inner: Mutex<Inner>,
    notify: Notify,
    stop: AtomicBool,
    max_pages: usize,
}

impl Frontier {
    pub fn new(max_pages: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            notify: Notify::new(),
            stop: AtomicBool::new(false),
            max_pages,
        }
    }

    /// Admits a URL to the frontier if it is new and the budget allows.
    ///
    /// Membership check and insertion are one atomic step under the lock,
    /// so two workers discovering the same URL concurrently admit it once.
    /// Returns `true` if the URL was admitted.
    pub fn enqueue(&self, url: Url) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if self.stop.load(Ordering::SeqCst) {
            return false;
        }

        if inner.visited.contains(url.as_str()) {
            return false;
        }

        inner.visited.insert(url.as_str().to_string());
        inner.queue.push_back(url);

        if inner.visited.len() >= self.max_pages {
            debug!(max_pages = self.max_pages, "Page budget reached, stopping admissions");
            self.stop.store(true, Ordering::SeqCst);
            // Wake waiters so idle workers re-evaluate termination
            self.notify.notify_waiters();
        }

        self.notify.notify_one();
        true
    }

    /// Takes the next URL, waiting up to `timeout` per wakeup cycle.
    ///
    /// Returns `None` when the crawl is finished for this worker: the queue
    /// is empty and either the stop signal is set or no URL is in flight
    /// anywhere. URLs already admitted are still handed out after the stop
    /// signal; stopping only blocks new admissions.
    pub async fn dequeue(&self, timeout: Duration) -> Option<Url> {
        loop {
            {
                let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(url) = inner.queue.pop_front() {
                    inner.in_flight += 1;
                    return Some(url);
                }
                if self.stop.load(Ordering::SeqCst) || inner.in_flight == 0 {
                    // Wake any sibling also parked in dequeue so the pool
                    // winds down instead of each waiting out its timeout
                    self.notify.notify_waiters();
                    return None;
                }
            }

            let _ = tokio::time::timeout(timeout, self.notify.notified()).await;
        }
    }

    /// Reports that a previously dequeued URL is fully processed
    pub fn task_done(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.in_flight = inner.in_flight.saturating_sub(1);
        if inner.in_flight == 0 {
            // Last in-flight page finished; idle workers must re-check
            self.notify.notify_waiters();
        } else {
            self.notify.notify_one();
        }
    }

    /// Sets the stop signal, blocking all further admissions
    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Whether the stop signal has been set
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Number of URLs ever admitted (the budget counter)
    pub fn visited_len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .visited
            .len()
    }
}
