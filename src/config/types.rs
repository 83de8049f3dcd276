use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    /// Optional PostgREST upsert sink; results stay local when absent
    #[serde(default)]
    pub sink: Option<SinkConfig>,

    /// Inline seed URLs
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Path to a newline-delimited seed file, merged after inline seeds
    #[serde(rename = "seed-file", default)]
    pub seed_file: Option<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages to fetch across the whole crawl
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Number of concurrent worker tasks
    pub workers: usize,

    /// Minimum time between requests to the same domain (milliseconds),
    /// used when robots.txt declares no crawl-delay
    #[serde(rename = "default-delay-ms", default = "default_delay_ms")]
    pub default_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_fetch_timeout() -> u64 {
    30
}

impl CrawlerConfig {
    /// Default per-domain delay as a `Duration`
    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms)
    }

    /// Per-request timeout as a `Duration`
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Builds the User-Agent header value, e.g. `PMRadarBot/0.1 (+https://...)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON results file
    #[serde(rename = "results-path")]
    pub results_path: String,
}

/// PostgREST upsert sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Base URL of the REST endpoint (without `/rest/v1/...`)
    pub url: String,

    /// API key, sent as both `apikey` and bearer token
    pub key: String,

    /// Target table name
    pub table: String,
}
