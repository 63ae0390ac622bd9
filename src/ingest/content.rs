//! Content resolution: the ordered fallback chain selecting the best
//! available HTML representation of an entry's body.

use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{Html, Selector};

use crate::feed::FeedEntry;
use crate::fetch::Fetcher;

/// Pick HTML content out of the feed entry itself, preferring full content
/// fields over summaries:
/// 1. content explicitly typed as HTML (`content:encoded`, Atom html content)
/// 2. summary typed as HTML (RSS descriptions, Atom `type="html"`)
/// 3. untyped summary that heuristically contains block-level tags
pub fn first_html_content(entry: &FeedEntry) -> Option<String> {
    if let Some(c) = entry.content_html.as_deref() {
        if !c.is_empty() {
            return Some(c.to_string());
        }
    }
    if entry.summary_is_html {
        if let Some(s) = entry.summary.as_deref() {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    if let Some(s) = entry.summary.as_deref() {
        if looks_like_html(s) {
            return Some(s.to_string());
        }
    }
    None
}

fn looks_like_html(s: &str) -> bool {
    static RE_BLOCK_TAG: OnceCell<Regex> = OnceCell::new();
    let re = RE_BLOCK_TAG.get_or_init(|| Regex::new(r"(?i)<(?:p|div|br|h1|h2|ul|ol)").unwrap());
    re.is_match(s)
}

/// Fetch the article at `url` and extract its readable body as HTML.
/// Any failure is recovered as absent content; the caller falls through to
/// the final fallback block.
pub async fn fetch_article_html(fetcher: &dyn Fetcher, url: &str) -> Option<String> {
    match fetcher.fetch(url).await {
        Ok(body) => extract_readable_html(&body),
        Err(e) => {
            tracing::error!(url, error = %e, "failed to fetch article");
            None
        }
    }
}

/// Minimum text length for a candidate container to count as the article
/// body rather than boilerplate.
const SUBSTANTIAL_TEXT_LEN: usize = 200;

/// Boilerplate-removal heuristic: walk a priority list of containers that
/// typically hold the article body and return the first substantial one's
/// inner HTML. Falls back to the whole body.
pub fn extract_readable_html(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    static SELECTORS: OnceCell<Vec<Selector>> = OnceCell::new();
    let selectors = SELECTORS.get_or_init(|| {
        [
            "article",
            "main",
            "[role='main']",
            ".post-content",
            ".article-content",
            ".entry-content",
            ".content-body",
            "#content",
        ]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
    });

    for selector in selectors {
        if let Some(element) = document.select(selector).next() {
            let text_len: usize = element.text().map(str::len).sum();
            if text_len > SUBSTANTIAL_TEXT_LEN {
                return Some(element.inner_html());
            }
        }
    }

    let body = Selector::parse("body").ok()?;
    let body = document.select(&body).next()?;
    let has_text = body.text().any(|t| !t.trim().is_empty());
    if has_text {
        Some(body.inner_html())
    } else {
        None
    }
}
