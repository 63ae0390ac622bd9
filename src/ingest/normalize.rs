//! Feed entry -> normalized item.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::feed::FeedEntry;

/// Hex digest length of the item fingerprint.
const HASH_LEN: usize = 24;

/// A feed entry normalized for storage. `hash` is assigned here and never
/// recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub url: Option<String>,
    /// ISO-8601, best-effort parsed from the feed's date string.
    pub published: Option<String>,
    pub author: String,
    pub tags: Vec<String>,
    /// Feed display name, falling back to the feed URL.
    pub source: String,
    /// Stable identifier from the feed, falling back to the entry URL.
    pub guid: Option<String>,
    /// sha256 over `guid|url|title`, truncated.
    pub hash: String,
}

pub fn normalize_entry(entry: &FeedEntry, feed_title: Option<&str>, feed_url: &str) -> FeedItem {
    let title = entry
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "(no title)".to_string());
    // An empty <link></link> deserializes as Some(""); treat it as absent so
    // it never becomes a guid or a dedup identifier.
    let url = entry.link.clone().filter(|u| !u.is_empty());
    let guid = entry.guid.clone().or_else(|| url.clone());

    let fingerprint = format!(
        "{}|{}|{}",
        guid.as_deref().unwrap_or(""),
        url.as_deref().unwrap_or(""),
        title
    );

    FeedItem {
        hash: sha256_hex(&fingerprint, HASH_LEN),
        published: entry.published.as_deref().and_then(parse_published),
        author: entry.author.clone().unwrap_or_default(),
        tags: entry.tags.clone(),
        source: feed_title
            .filter(|t| !t.is_empty())
            .unwrap_or(feed_url)
            .to_string(),
        title,
        url,
        guid,
    }
}

/// Best-effort date parsing: RFC 2822 (RSS), RFC 3339 (Atom), then a couple
/// of common bare formats. Unparseable dates become `None`.
fn parse_published(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.to_rfc3339());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.to_rfc3339());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().to_rfc3339());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc().to_rfc3339());
    }
    None
}

/// Lowercase hex of a sha256 digest, truncated to `len` characters.
pub(crate) fn sha256_hex(input: &str, len: usize) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(input.as_bytes());
    let mut out = String::with_capacity(len);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
        if out.len() >= len {
            break;
        }
    }
    out.truncate(len);
    out
}
