//! # postsync CLI Application
//!
//! This module implements the command-line interface for the postsync
//! pipelines, providing access to both through a small set of subcommands.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands for the two pipelines:
//!   - `crawl`: walk a blog index and persist normalized posts
//!   - `sync`: project change events from a file into the search index
//!   - `status`: inspect what the store currently holds
//!
//! ## Features
//!
//! - Configurable crawling with pagination and pacing controls
//! - Progress tracking for long-running crawls
//! - Acknowledgment-aware change-event replay from newline-delimited JSON

mod telemetry;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use postsync::cdc::{Consumer, JsonLinesTransport, Projector};
use postsync::crawler::{self, CrawlerConfig, PageFetcher};
use postsync::index::Database;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "postsync", version, about = "Blog crawling and CDC indexing")]
struct Cli {
    /// Path to the local database
    #[arg(long, default_value = ".postsync/postsync.db", global = true)]
    db: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl a blog index and store normalized posts
    Crawl(CrawlArgs),

    /// Project change events from a newline-delimited JSON file into the
    /// search index
    Sync {
        /// Path to the change-event file
        events: PathBuf,
    },

    /// Show how many posts the store currently holds
    Status,
}

#[derive(Args)]
struct CrawlArgs {
    /// Root URL of the blog index
    root: String,

    /// Stop after this many index pages
    #[arg(long)]
    page_stop: Option<u32>,

    /// Delay in milliseconds between requests
    #[arg(long, default_value_t = 200)]
    wait_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing_subscriber();
    let cli = Cli::parse();

    if let Some(parent) = std::path::Path::new(&cli.db).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {}", parent.display()))?;
        }
    }
    let db = Database::new_from_path(&cli.db)
        .await
        .with_context(|| format!("opening database {}", cli.db))?;

    match cli.command {
        Command::Crawl(args) => crawl(&db, args).await,
        Command::Sync { events } => sync(db, &events).await,
        Command::Status => {
            let count = db.count_posts().await?;
            println!("{} posts stored", count);
            Ok(())
        }
    }
}

async fn crawl(db: &Database, args: CrawlArgs) -> Result<()> {
    let mut builder = CrawlerConfig::builder()
        .root_url(args.root)
        .wait_ms(args.wait_ms);
    if let Some(page_stop) = args.page_stop {
        builder = builder.page_stop(page_stop);
    }
    let config = builder.build();

    let fetcher = PageFetcher::new(&config)?;
    let posts = crawler::crawl_blog(&fetcher, &config).await?;
    info!("Crawled {} posts", posts.len());

    let progress = ProgressBar::new(posts.len() as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );
    for post in &posts {
        progress.set_message(post.title.clone());
        db.upsert_post(post).await?;
        progress.inc(1);
    }
    progress.finish_with_message("done");

    println!("Stored {} posts ({} total)", posts.len(), db.count_posts().await?);
    Ok(())
}

async fn sync(db: Database, events: &std::path::Path) -> Result<()> {
    let transport = JsonLinesTransport::open(events)
        .await
        .with_context(|| format!("opening change-event file {}", events.display()))?;

    let mut consumer = Consumer::new(transport, Projector::new(db));
    let report = consumer.run().await?;

    println!(
        "Projected {} events, skipped {} malformed",
        report.processed, report.skipped
    );
    Ok(())
}
