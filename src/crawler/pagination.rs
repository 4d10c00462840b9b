//! Pagination walking and post-link discovery

use crate::crawler::error::CrawlError;
use crate::crawler::fetch::PageFetcher;
use crate::crawler::CrawlerConfig;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// Fewer post links than this on an index page means the index has ended
const MIN_POSTS_PER_PAGE: usize = 2;

/// Build the URL of the n-th index page (1-based); page 1 is the root itself
pub fn page_url(root: &str, page: u32) -> String {
    if page <= 1 {
        root.to_string()
    } else {
        format!("{}page/{}/", root, page)
    }
}

/// Collect every anchor href on a page, sorted and deduplicated
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    // The selector literal is known-valid; parse cannot fail on it.
    let anchors = Selector::parse("a[href]").expect("valid selector");

    let links: BTreeSet<String> = document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect();

    links.into_iter().collect()
}

/// Keep only links that point at posts under the index root.
///
/// A post link starts with the root, has a non-empty tail, and is not itself
/// a pagination link.
pub fn filter_post_links(links: &[String], root: &str) -> Vec<String> {
    debug!("Filtering {} links", links.len());

    let filtered: Vec<String> = links
        .iter()
        .filter(|href| href.starts_with(root))
        .filter(|href| {
            let tail = &href[root.len()..];
            !tail.is_empty() && !tail.starts_with("page")
        })
        .cloned()
        .collect();

    debug!("Filtered down to {} links", filtered.len());
    filtered
}

/// Whether a link under the root is a date archive rather than a post
/// (its tail is all digits, e.g. `<root>/2023/`)
pub fn is_archive_link(url: &str, root: &str) -> bool {
    let tail: String = url[root.len()..].replace('/', "");
    !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit())
}

/// Walk the paginated index and collect the URLs of all posts.
///
/// Stops at `page_stop`, on a fetch failure, or when an index page carries
/// fewer than two post links.
#[instrument(skip(fetcher, config), fields(root = %config.root_url))]
pub async fn extract_post_urls(
    fetcher: &PageFetcher,
    config: &CrawlerConfig,
) -> Result<Vec<String>, CrawlError> {
    let mut urls: BTreeSet<String> = BTreeSet::new();
    let mut page: u32 = 0;

    loop {
        page += 1;

        if let Some(stop) = config.page_stop {
            if page > stop {
                info!("Stopping extraction at page {}", page);
                break;
            }
        }

        if page > 1 {
            tokio::time::sleep(config.wait()).await;
        }

        let index_url = page_url(&config.root_url, page);
        debug!("Page URL: {}", index_url);

        let html = match fetcher.fetch(&index_url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to fetch index page {}: {}", index_url, e);
                break;
            }
        };

        let links = extract_links(&html);
        let posts = filter_post_links(&links, &config.root_url);
        info!("Page {}: {} post links", page, posts.len());

        if posts.len() < MIN_POSTS_PER_PAGE {
            info!("Not enough post links on page {}, stopping", page);
            break;
        }
        urls.extend(posts);
    }

    // Date archives look like posts to the prefix filter; drop them here.
    let urls: Vec<String> = urls
        .into_iter()
        .filter(|url| !is_archive_link(url, &config.root_url))
        .collect();

    info!("Extracted {} post URLs", urls.len());
    Ok(urls)
}
