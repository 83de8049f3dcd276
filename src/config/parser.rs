use crate::config::types::Config;
use crate::ConfigError;
use std::path::Path;
use url::Url;

/// Loads and parses a configuration file from the given path
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pmradar_crawler::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Page budget: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Validates configuration values
fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.crawler.max_pages == 0 {
        return Err(ConfigError::Validation(
            "max-pages must be at least 1".to_string(),
        ));
    }

    if config.crawler.workers == 0 {
        return Err(ConfigError::Validation(
            "workers must be at least 1".to_string(),
        ));
    }

    if config.crawler.fetch_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.user_agent.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name must not be empty".to_string(),
        ));
    }

    if config.output.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results-path must not be empty".to_string(),
        ));
    }

    if let Some(sink) = &config.sink {
        if sink.url.is_empty() || sink.key.is_empty() || sink.table.is_empty() {
            return Err(ConfigError::Validation(
                "sink requires url, key and table".to_string(),
            ));
        }
    }

    Ok(())
}

/// Resolves the full seed list: inline seeds first, then the seed file.
///
/// Seed-file lines are trimmed; blank lines and `#` comments are skipped.
/// Every seed must parse as an absolute http(s) URL.
pub fn resolve_seeds(config: &Config) -> Result<Vec<Url>, ConfigError> {
    let mut raw: Vec<String> = config.seeds.clone();

    if let Some(seed_file) = &config.seed_file {
        let content = std::fs::read_to_string(seed_file)?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            raw.push(line.to_string());
        }
    }

    if raw.is_empty() {
        return Err(ConfigError::Validation(
            "no seed URLs configured (set seeds or seed-file)".to_string(),
        ));
    }

    let mut seeds = Vec::with_capacity(raw.len());
    for s in raw {
        let url = crate::url::normalize_seed(&s)
            .map_err(|e| ConfigError::InvalidSeed(format!("{}: {}", s, e)))?;
        seeds.push(url);
    }

    Ok(seeds)
}
