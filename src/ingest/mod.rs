//! One sequential pass over all configured feeds: normalize, dedup, resolve
//! content, convert, write, record.

pub mod content;
pub mod normalize;
pub mod state;

use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::convert::{self, Block, RichTextSpan};
use crate::feed::{self, opml};
use crate::fetch::Fetcher;
use crate::ingest::normalize::normalize_entry;
use crate::ingest::state::DedupStore;
use crate::notion::{NotionApi, NotionWriter};

/// Pause after each written entry, rate-limit friendly.
const ENTRY_PACING: Duration = Duration::from_millis(350);

/// Per-feed result collected by the run; a failing feed never aborts the
/// others.
#[derive(Debug)]
pub struct FeedOutcome {
    pub feed_url: String,
    pub result: Result<usize>,
}

/// Process every configured feed once. Dedup state is flushed after each
/// feed, so a crash loses at most the current feed's progress.
pub async fn run<A: NotionApi>(
    cfg: &Config,
    fetcher: &dyn Fetcher,
    writer: &NotionWriter<A>,
) -> Result<Vec<FeedOutcome>> {
    let mut feeds = cfg.feeds.clone();
    if feeds.is_empty() {
        if let Some(opml_url) = &cfg.opml_url {
            match load_opml_feeds(fetcher, opml_url).await {
                Ok(list) => feeds = list,
                Err(e) => tracing::warn!(error = %e, "could not load OPML feed list"),
            }
        }
    }
    if feeds.is_empty() {
        tracing::warn!("no feeds configured (set FEEDS or FEEDS_OPML_URL)");
        return Ok(Vec::new());
    }

    let mut dedup = DedupStore::load(&cfg.state_path);
    let mut outcomes = Vec::with_capacity(feeds.len());

    for feed_url in feeds {
        let result = process_feed(cfg, fetcher, writer, &feed_url, &mut dedup).await;
        match &result {
            Ok(new_items) => {
                tracing::info!(feed = %feed_url, new_items, "processed feed");
            }
            Err(e) => {
                tracing::error!(feed = %feed_url, error = ?e, "error processing feed");
            }
        }
        // Keys accumulated so far are persisted even when this feed failed
        // midway.
        if let Err(e) = dedup.flush() {
            tracing::error!(error = %e, "failed to persist dedup state");
        }
        outcomes.push(FeedOutcome { feed_url, result });
    }

    Ok(outcomes)
}

async fn load_opml_feeds(fetcher: &dyn Fetcher, opml_url: &str) -> Result<Vec<String>> {
    let xml = fetcher
        .fetch(opml_url)
        .await
        .context("fetching OPML document")?;
    opml::feed_urls(&xml)
}

/// Process one feed's entries in document order. Returns the number of new
/// items written.
async fn process_feed<A: NotionApi>(
    cfg: &Config,
    fetcher: &dyn Fetcher,
    writer: &NotionWriter<A>,
    feed_url: &str,
    dedup: &mut DedupStore,
) -> Result<usize> {
    let xml = fetcher.fetch(feed_url).await.context("fetching feed")?;
    let parsed = feed::parse_feed(&xml).context("parsing feed")?;
    let mut new_count = 0usize;

    for entry in &parsed.entries {
        let item = normalize_entry(entry, parsed.title.as_deref(), feed_url);

        // Remote check first: the store is the source of truth across runs
        // and machines; the local key set is the fast second line.
        if writer
            .exists_by_guid_or_url(item.guid.as_deref(), item.url.as_deref())
            .await?
        {
            continue;
        }
        let key = state::seen_key(feed_url, item.guid.as_deref(), item.url.as_deref());
        if dedup.contains(&key) {
            continue;
        }

        let html = match content::first_html_content(entry) {
            Some(h) => Some(h),
            None => match item.url.as_deref() {
                Some(u) => content::fetch_article_html(fetcher, u).await,
                None => None,
            },
        };

        let mut blocks = html
            .map(|h| convert::html_to_blocks(&h, item.url.as_deref(), cfg.max_blocks))
            .unwrap_or_default();
        if blocks.is_empty() {
            blocks = vec![fallback_block(item.url.as_deref())];
        }

        writer.write_item(&item, &blocks).await?;
        dedup.insert(key);
        new_count += 1;

        tokio::time::sleep(ENTRY_PACING).await;
    }

    Ok(new_count)
}

/// The single paragraph written when no content source yields anything.
fn fallback_block(url: Option<&str>) -> Block {
    let text = format!("Open on the web: {}", url.unwrap_or("No URL"));
    Block::paragraph(vec![RichTextSpan::plain(text)])
}
