//! Content extraction for blog posts
//!
//! Pulls the title, timestamps, taxonomy, body paragraphs, and key takeaways
//! out of a post page, normalizing typographic characters and dropping
//! boilerplate paragraphs along the way.

use crate::crawler::BlogPost;
use crate::crawler::CrawlerConfig;
use crate::crawler::error::CrawlError;
use chrono::{DateTime, FixedOffset};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Typographic characters replaced with plain equivalents
const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{201c}', "'"),
    ('\u{201d}', "'"),
    ('\u{2019}', "'"),
    ('\u{2018}', "'"),
    ('\u{2026}', "..."),
    ('\u{2014}', "-"),
    ('\u{00a0}', " "),
];

/// Replace smart quotes, ellipses, dashes, and non-breaking spaces with
/// plain-text equivalents
pub fn normalize_text(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    'chars: for c in text.chars() {
        for (from, to) in REPLACEMENTS {
            if c == *from {
                normalized.push_str(to);
                continue 'chars;
            }
        }
        normalized.push(c);
    }
    normalized
}

fn selector(css: &str) -> Result<Selector, CrawlError> {
    Selector::parse(css)
        .map_err(|e| CrawlError::HtmlParse(format!("Failed to parse selector '{}': {}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(element.text().collect::<String>().trim())
}

/// Extract a normalized [`BlogPost`] from a post page
pub fn extract_post(
    url: &str,
    html: &str,
    config: &CrawlerConfig,
) -> Result<BlogPost, CrawlError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document)?;
    let (created, updated) = extract_timestamps(&document)?;
    let (categories, tags) = extract_taxonomy(&document)?;
    let paragraphs = extract_paragraphs(&document, &config.exclude_prefixes)?;
    let key_takeaways = extract_key_takeaways(&document)?;

    debug!("Extracted post '{}' from {}", title, url);

    Ok(BlogPost {
        url: url.to_string(),
        title,
        created,
        updated,
        categories,
        tags,
        paragraphs,
        key_takeaways,
    })
}

fn extract_title(document: &Html) -> Result<String, CrawlError> {
    let title_selector = selector("h1.entry-title")?;

    document
        .select(&title_selector)
        .next()
        .map(element_text)
        .ok_or_else(|| CrawlError::ContentExtraction("Post has no entry title".to_string()))
}

fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Unparseable datetime attribute {:?}: {}", raw, e);
            None
        }
    }
}

/// Created comes from the `time.updated` element, updated from the second
/// `time` element on the page; either may be missing or unparseable
fn extract_timestamps(
    document: &Html,
) -> Result<(Option<DateTime<FixedOffset>>, Option<DateTime<FixedOffset>>), CrawlError> {
    let created_selector = selector("time.updated")?;
    let time_selector = selector("time")?;

    let created = document
        .select(&created_selector)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .and_then(parse_datetime);

    let updated = document
        .select(&time_selector)
        .nth(1)
        .and_then(|el| el.value().attr("datetime"))
        .and_then(parse_datetime);

    Ok((created, updated))
}

/// Categories and tags are carried as `category-*` and `tag-*` classes on
/// the `article` element
fn extract_taxonomy(document: &Html) -> Result<(Vec<String>, Vec<String>), CrawlError> {
    let article_selector = selector("article")?;

    let Some(article) = document.select(&article_selector).next() else {
        return Ok((Vec::new(), Vec::new()));
    };

    let mut categories = Vec::new();
    let mut tags = Vec::new();
    for class in article.value().classes() {
        if let Some(category) = class.strip_prefix("category-") {
            categories.push(category.to_string());
        } else if let Some(tag) = class.strip_prefix("tag-") {
            tags.push(tag.to_string());
        }
    }

    Ok((categories, tags))
}

/// Body paragraphs are `p.p1` elements, with a bare `p` fallback for posts
/// that predate that markup; empty and boilerplate paragraphs are dropped
fn extract_paragraphs(
    document: &Html,
    exclude_prefixes: &[String],
) -> Result<Vec<String>, CrawlError> {
    let preferred = selector("p.p1")?;
    let fallback = selector("p")?;

    let mut raw: Vec<String> = document.select(&preferred).map(element_text).collect();
    if raw.is_empty() {
        raw = document.select(&fallback).map(element_text).collect();
    }

    let paragraphs: Vec<String> = raw
        .into_iter()
        .filter(|p| !p.is_empty())
        .filter(|p| !exclude_prefixes.iter().any(|prefix| p.starts_with(prefix)))
        .collect();

    debug!("Extracted {} clean paragraphs", paragraphs.len());
    Ok(paragraphs)
}

/// Key takeaways are the items of the `ul` following the "KEY TAKEAWAYS"
/// marker paragraph; posts without the marker yield an empty list
fn extract_key_takeaways(document: &Html) -> Result<Vec<String>, CrawlError> {
    let paragraph_selector = selector("p")?;
    let item_selector = selector("li")?;

    let Some(marker) = document
        .select(&paragraph_selector)
        .find(|p| element_text(*p) == "KEY TAKEAWAYS")
    else {
        debug!("No key takeaways found");
        return Ok(Vec::new());
    };

    let Some(list) = marker
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "ul")
    else {
        return Ok(Vec::new());
    };

    let takeaways: Vec<String> = list
        .select(&item_selector)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    debug!("Extracted {} key takeaways", takeaways.len());
    Ok(takeaways)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST_HTML: &str = r#"<html><body>
        <article class="post category-nutrition tag-greens status-publish">
            <h1 class="entry-title">Eat’s Good</h1>
            <time class="updated" datetime="2024-01-01T08:00:00-05:00">Jan 1</time>
            <time datetime="2024-02-01T08:00:00-05:00">Feb 1</time>
            <p class="p1">First paragraph.</p>
            <p class="p1">Written By a bot.</p>
            <p class="p1"></p>
            <p class="p1">Second paragraph.</p>
            <p>KEY TAKEAWAYS</p>
            <ul>
                <li>Takeaway one.</li>
                <li>Takeaway two.</li>
            </ul>
        </article>
    </body></html>"#;

    fn test_config() -> CrawlerConfig {
        CrawlerConfig::default()
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(
            normalize_text("\u{201c}quoted\u{201d} \u{2014} it\u{2019}s fine\u{2026}"),
            "'quoted' - it's fine..."
        );
        assert_eq!(normalize_text("a\u{00a0}b"), "a b");
        assert_eq!(normalize_text("plain text"), "plain text");
    }

    #[test]
    fn test_extract_post() {
        let post =
            extract_post("https://example.com/blog/eats-good/", POST_HTML, &test_config())
                .unwrap();

        assert_eq!(post.url, "https://example.com/blog/eats-good/");
        assert_eq!(post.title, "Eat's Good");
        assert_eq!(post.categories, vec!["nutrition".to_string()]);
        assert_eq!(post.tags, vec!["greens".to_string()]);
        assert_eq!(
            post.paragraphs,
            vec!["First paragraph.".to_string(), "Second paragraph.".to_string()]
        );
        assert_eq!(
            post.key_takeaways,
            vec!["Takeaway one.".to_string(), "Takeaway two.".to_string()]
        );
        assert_eq!(
            post.created.unwrap().to_rfc3339(),
            "2024-01-01T08:00:00-05:00"
        );
        assert_eq!(
            post.updated.unwrap().to_rfc3339(),
            "2024-02-01T08:00:00-05:00"
        );
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let html = "<html><body><p>no title</p></body></html>";
        let result = extract_post("https://example.com/a/", html, &test_config());
        assert!(matches!(result, Err(CrawlError::ContentExtraction(_))));
    }

    #[test]
    fn test_paragraph_fallback_without_p1_class() {
        let html = r#"<html><body>
            <h1 class="entry-title">Title</h1>
            <p>Only plain paragraphs.</p>
        </body></html>"#;

        let post = extract_post("https://example.com/a/", html, &test_config()).unwrap();
        assert_eq!(post.paragraphs, vec!["Only plain paragraphs.".to_string()]);
    }

    #[test]
    fn test_post_without_takeaways_yields_empty_list() {
        let html = r#"<html><body>
            <h1 class="entry-title">Title</h1>
            <p class="p1">Body.</p>
        </body></html>"#;

        let post = extract_post("https://example.com/a/", html, &test_config()).unwrap();
        assert!(post.key_takeaways.is_empty());
    }
}
