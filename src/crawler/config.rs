//! # Crawler Configuration Module
//!
//! This module provides configuration options for the blog crawler, including
//! the index root, pagination limits, request pacing, and the boilerplate
//! prefixes stripped from post bodies. It uses a builder pattern for flexible
//! configuration.

use std::time::Duration;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Root URL of the paginated blog index
    pub root_url: String,

    /// Stop after this many index pages; `None` walks until the index ends
    pub page_stop: Option<u32>,

    /// Delay in milliseconds between requests
    pub wait_ms: u64,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User agent to use for requests
    pub user_agent: String,

    /// Paragraphs starting with any of these prefixes are dropped as
    /// boilerplate
    pub exclude_prefixes: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: String::new(),
            page_stop: None,
            wait_ms: 200,
            timeout_secs: 10,
            user_agent: format!("postsync-crawler/{}", env!("CARGO_PKG_VERSION")),
            exclude_prefixes: vec![
                "Written By".to_string(),
                "Image Credit".to_string(),
                "PS:".to_string(),
                "Subscribe".to_string(),
                "Catch up".to_string(),
                "Check out".to_string(),
                "For more on".to_string(),
                "Interested in learning more about".to_string(),
            ],
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the root URL of the blog index; a trailing slash is appended if
    /// missing so pagination URLs compose cleanly
    pub fn root_url(mut self, root_url: impl Into<String>) -> Self {
        let mut root = root_url.into();
        if !root.ends_with('/') {
            root.push('/');
        }
        self.config.root_url = root;
        self
    }

    /// Set the maximum number of index pages to walk
    pub fn page_stop(mut self, page_stop: u32) -> Self {
        self.config.page_stop = Some(page_stop);
        self
    }

    /// Set the delay in milliseconds between requests
    pub fn wait_ms(mut self, wait_ms: u64) -> Self {
        self.config.wait_ms = wait_ms;
        self
    }

    /// Set the per-request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the boilerplate prefixes to exclude from post bodies
    pub fn exclude_prefixes(mut self, exclude_prefixes: Vec<String>) -> Self {
        self.config.exclude_prefixes = exclude_prefixes;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Get the inter-request delay as a Duration
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_normalizes_root_url() {
        let config = CrawlerConfig::builder()
            .root_url("https://example.com/blog")
            .build();
        assert_eq!(config.root_url, "https://example.com/blog/");

        let config = CrawlerConfig::builder()
            .root_url("https://example.com/blog/")
            .build();
        assert_eq!(config.root_url, "https://example.com/blog/");
    }

    #[test]
    fn test_builder_overrides() {
        let config = CrawlerConfig::builder()
            .root_url("https://example.com/blog/")
            .page_stop(3)
            .wait_ms(0)
            .timeout_secs(5)
            .user_agent("test-agent")
            .build();

        assert_eq!(config.page_stop, Some(3));
        assert_eq!(config.wait(), Duration::from_millis(0));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.user_agent, "test-agent");
    }
}
