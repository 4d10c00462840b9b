//! Blog crawler module
//!
//! This module walks a paginated blog index, fetches each post, extracts
//! normalized content and metadata, and hands the result to the document
//! store. The fetch-parse-store loop is sequential with a fixed
//! inter-request delay; per-post failures are logged and skipped so one bad
//! page does not end the crawl.

mod config;
mod content;
mod error;
mod fetch;
mod pagination;

pub use config::{CrawlerConfig, CrawlerConfigBuilder};
pub use content::{extract_post, normalize_text};
pub use error::CrawlError;
pub use fetch::PageFetcher;
pub use pagination::extract_post_urls;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// A normalized blog post, ready for the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    /// URL the post was crawled from
    pub url: String,

    /// Post title
    pub title: String,

    /// Publication timestamp, if the page carried one
    pub created: Option<DateTime<FixedOffset>>,

    /// Last-updated timestamp, if the page carried one
    pub updated: Option<DateTime<FixedOffset>>,

    /// Categories the post is filed under
    pub categories: Vec<String>,

    /// Tags attached to the post
    pub tags: Vec<String>,

    /// Cleaned body paragraphs
    pub paragraphs: Vec<String>,

    /// Key takeaways, when the post carries a takeaway section
    pub key_takeaways: Vec<String>,
}

/// Crawl the configured blog and return every post that could be extracted.
///
/// Discovers post URLs by walking the paginated index, then fetches and
/// extracts each post in turn, pausing for the configured delay between
/// requests. Fetch or extraction failures on individual posts are logged
/// and skipped.
#[instrument(skip(fetcher, config), fields(root = %config.root_url))]
pub async fn crawl_blog(
    fetcher: &PageFetcher,
    config: &CrawlerConfig,
) -> Result<Vec<BlogPost>, CrawlError> {
    let urls = pagination::extract_post_urls(fetcher, config).await?;
    info!("Discovered {} post URLs", urls.len());

    let mut posts = Vec::new();
    for url in urls {
        tokio::time::sleep(config.wait()).await;

        let html = match fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to fetch post {}: {}", url, e);
                continue;
            }
        };

        match content::extract_post(&url, &html, config) {
            Ok(post) => posts.push(post),
            Err(e) => warn!("Failed to extract post {}: {}", url, e),
        }
    }

    info!("Crawled {} posts", posts.len());
    Ok(posts)
}
