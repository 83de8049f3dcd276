//! Robots.txt policy parsing
//!
//! Allow/disallow matching is delegated to the robotstxt crate; crawl-delay
//! is parsed manually since the matcher does not expose it.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// Per-domain exclusion policy parsed from robots.txt
///
/// A policy with no content behaves as fail-open: everything is allowed and
/// no crawl-delay is declared. Exclusion files are advisory and frequently
/// absent, so fetch failures degrade to this variant.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Raw robots.txt content; `None` means fail-open
    content: Option<String>,
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
        }
    }

    /// Creates the fail-open policy: everything allowed, no declared delay
    pub fn allow_all() -> Self {
        Self { content: None }
    }

    /// Checks whether a URL is allowed for the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        let content = match &self.content {
            Some(c) if !c.is_empty() => c,
            _ => return true,
        };

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(content, user_agent, url)
    }

    /// Returns the declared crawl-delay for the given user agent, if any.
    ///
    /// A `Crawl-delay` directive applies to the preceding `User-agent`
    /// group; a group naming the agent specifically wins over the `*`
    /// wildcard group. Matching is case-insensitive and values may be
    /// fractional seconds.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        let content = self.content.as_deref().filter(|c| !c.is_empty())?;
        let wanted = user_agent.to_lowercase();

        let mut group_agents: Vec<String> = Vec::new();
        let mut wildcard_delay: Option<f64> = None;
        let mut agent_delay: Option<f64> = None;
        // A Disallow/Allow/Crawl-delay line closes the User-agent header run
        let mut in_group_header = false;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !in_group_header {
                        group_agents.clear();
                        in_group_header = true;
                    }
                    group_agents.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    in_group_header = false;
                    if let Ok(delay) = value.parse::<f64>() {
                        if group_agents.iter().any(|ua| ua != "*" && wanted.contains(ua.as_str())) {
                            agent_delay = Some(delay);
                        } else if group_agents.iter().any(|ua| ua == "*") {
                            wildcard_delay = Some(delay);
                        }
                    }
                }
                _ => {
                    in_group_header = false;
                }
            }
        }

        agent_delay
            .or(wildcard_delay)
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let policy = RobotsPolicy::allow_all();
        assert!(policy.is_allowed("/any/path", "TestBot"));
        assert!(policy.is_allowed("/admin", "TestBot"));
        assert_eq!(policy.crawl_delay("TestBot"), None);
    }

    #[test]
    fn test_empty_content_allows_all() {
        let policy = RobotsPolicy::from_content("");
        assert!(policy.is_allowed("/any/path", "TestBot"));
    }

    #[test]
    fn test_disallow_all() {
        let policy = RobotsPolicy::from_content("User-agent: *\nDisallow: /");
        assert!(!policy.is_allowed("/", "TestBot"));
        assert!(!policy.is_allowed("/page", "TestBot"));
    }

    #[test]
    fn test_disallow_prefix() {
        let policy = RobotsPolicy::from_content("User-agent: *\nDisallow: /admin");
        assert!(policy.is_allowed("/page", "TestBot"));
        assert!(!policy.is_allowed("/admin", "TestBot"));
        assert!(!policy.is_allowed("/admin/users", "TestBot"));
    }

    #[test]
    fn test_allow_overrides_disallow() {
        let policy =
            RobotsPolicy::from_content("User-agent: *\nDisallow: /private\nAllow: /private/public");
        assert!(!policy.is_allowed("/private", "TestBot"));
        assert!(policy.is_allowed("/private/public", "TestBot"));
    }

    #[test]
    fn test_specific_agent_blocked() {
        let policy =
            RobotsPolicy::from_content("User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /");
        assert!(policy.is_allowed("/page", "GoodBot"));
        assert!(!policy.is_allowed("/page", "BadBot"));
    }

    #[test]
    fn test_full_url_allowed_check() {
        let policy = RobotsPolicy::from_content("User-agent: *\nDisallow: /private/");
        assert!(!policy.is_allowed("https://example.com/private/data", "TestBot"));
        assert!(policy.is_allowed("https://example.com/public", "TestBot"));
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let policy = RobotsPolicy::from_content("User-agent: *\nCrawl-delay: 10\nDisallow: /admin");
        assert_eq!(policy.crawl_delay("TestBot"), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_crawl_delay_specific_agent_preferred() {
        let policy = RobotsPolicy::from_content(
            "User-agent: TestBot\nCrawl-delay: 5\n\nUser-agent: *\nCrawl-delay: 10",
        );
        assert_eq!(policy.crawl_delay("TestBot"), Some(Duration::from_secs(5)));
        assert_eq!(policy.crawl_delay("OtherBot"), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_crawl_delay_absent() {
        let policy = RobotsPolicy::from_content("User-agent: *\nDisallow: /admin");
        assert_eq!(policy.crawl_delay("TestBot"), None);
    }

    #[test]
    fn test_crawl_delay_fractional() {
        let policy = RobotsPolicy::from_content("User-agent: *\nCrawl-delay: 2.5");
        assert_eq!(
            policy.crawl_delay("TestBot"),
            Some(Duration::from_secs_f64(2.5))
        );
    }

    #[test]
    fn test_crawl_delay_case_insensitive() {
        let policy = RobotsPolicy::from_content("User-agent: TestBot\ncrawl-delay: 7");
        assert_eq!(policy.crawl_delay("testbot"), Some(Duration::from_secs(7)));
        assert_eq!(policy.crawl_delay("TESTBOT"), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_crawl_delay_grouped_agents() {
        let policy = RobotsPolicy::from_content("User-agent: BotA\nUser-agent: BotB\nCrawl-delay: 3");
        assert_eq!(policy.crawl_delay("BotA"), Some(Duration::from_secs(3)));
        assert_eq!(policy.crawl_delay("BotB"), Some(Duration::from_secs(3)));
        assert_eq!(policy.crawl_delay("BotC"), None);
    }

    #[test]
    fn test_crawl_delay_negative_ignored() {
        let policy = RobotsPolicy::from_content("User-agent: *\nCrawl-delay: -5");
        assert_eq!(policy.crawl_delay("TestBot"), None);
    }

    #[test]
    fn test_agent_token_matches_product_prefix() {
        // UA headers look like "PMRadarBot/0.1 (+https://...)"; the token in
        // robots.txt is just the product name.
        let policy = RobotsPolicy::from_content("User-agent: PMRadarBot\nCrawl-delay: 4");
        assert_eq!(
            policy.crawl_delay("PMRadarBot/0.1 (+https://example.com)"),
            Some(Duration::from_secs(4))
        );
    }
}
