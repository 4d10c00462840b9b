//! HTTP fetching for the crawler module

use crate::crawler::CrawlerConfig;
use crate::crawler::error::CrawlError;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// HTTP client for fetching blog pages
#[derive(Debug, Clone)]
pub struct PageFetcher {
    /// The underlying reqwest client
    client: ReqwestClient,
}

impl PageFetcher {
    /// Create a fetcher configured with the crawler's user agent and timeout
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(CrawlError::Http)?;

        Ok(Self { client })
    }

    /// Fetch the body of a page, treating non-2xx statuses as errors
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;

        info!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_config() -> CrawlerConfig {
        CrawlerConfig::builder().wait_ms(0).build()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/blog/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>ok</body></html>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = PageFetcher::new(&test_config()).unwrap();
        let body = fetcher.fetch(&format!("{}/blog/", server.url())).await.unwrap();

        assert!(body.contains("ok"));
        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = Server::new_async().await;
        let _mock_server = server
            .mock("GET", "/missing/")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = PageFetcher::new(&test_config()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing/", server.url())).await;

        assert!(matches!(result, Err(CrawlError::Http(_))));
    }
}
