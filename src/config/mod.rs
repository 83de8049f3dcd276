//! Configuration loading and validation
//!
//! Configuration is a TOML file with kebab-case keys, plus an optional
//! newline-delimited seed file merged at load time.

mod parser;
mod types;

pub use parser::{load_config, resolve_seeds};
pub use types::{Config, CrawlerConfig, OutputConfig, SinkConfig, UserAgentConfig};
