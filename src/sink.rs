//! Result sinks
//!
//! The engine hands every crawl result to a [`RecordSink`] as it is
//! produced. The sink is injected as a trait object, so the destination
//! (PostgREST table, nothing at all, a test collector) is the caller's
//! choice rather than a crawler concern. Sink failures are reported to the
//! caller but must never abort the crawl.

use crate::{CrawlError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One structured-data record ready for upsert
#[derive(Debug, Clone, Serialize)]
pub struct UpsertRecord {
    /// The page URL, used as the upsert conflict key
    pub url: String,
    pub json_ld: Vec<Value>,
    pub microdata: Vec<Value>,
    pub scraped_at: DateTime<Utc>,
}

/// Destination for crawl results
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn upsert(&self, record: &UpsertRecord) -> Result<()>;
}

/// Sink that discards everything, used when no sink is configured
pub struct NullSink;

#[async_trait]
impl RecordSink for NullSink {
    async fn upsert(&self, _record: &UpsertRecord) -> Result<()> {
        Ok(())
    }
}

/// PostgREST-style upsert sink (Supabase REST API)
///
/// Records go to `{base}/rest/v1/{table}` with
/// `Prefer: resolution=merge-duplicates`, so the table's unique constraint
/// on `url` turns repeated crawls into updates.
pub struct SupabaseSink {
    client: reqwest::Client,
    endpoint: String,
    key: String,
}

impl SupabaseSink {
    pub fn new(client: reqwest::Client, base_url: &str, key: String, table: &str) -> Self {
        let endpoint = format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table);
        Self {
            client,
            endpoint,
            key,
        }
    }
}

#[async_trait]
impl RecordSink for SupabaseSink {
    async fn upsert(&self, record: &UpsertRecord) -> Result<()> {
        // The REST API expects a list of rows even for a single upsert
        let payload = [record];

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
            .header("Content-Type", "application/json")
            .header("Prefer", "resolution=merge-duplicates")
            .json(&payload)
            .send()
            .await
            .map_err(|e| CrawlError::Sink(format!("upsert request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrawlError::Sink(format!(
                "upsert rejected with status {}: {}",
                status.as_u16(),
                body
            )));
        }

        Ok(())
    }
}
