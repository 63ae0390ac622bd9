//! RSS 2.0 / Atom parsing into a common entry shape.

pub mod opml;

use anyhow::{bail, Context, Result};
use quick_xml::de::from_str;
use quick_xml::events::Event;
use serde::Deserialize;

/// One syndication entry, normalized across feed dialects. Field contents
/// are raw feed values; item-level normalization happens in `ingest`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    /// Raw date string as published by the feed.
    pub published: Option<String>,
    /// Full content explicitly typed as HTML (`content:encoded`, Atom
    /// `content type="html"`).
    pub content_html: Option<String>,
    pub summary: Option<String>,
    /// True when the summary itself was explicitly marked as HTML.
    pub summary_is_html: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

// ---------- RSS 2.0 ----------

#[derive(Debug, Deserialize)]
struct Rss {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    guid: Option<RssGuid>,
    author: Option<String>,
    // quick-xml's serde deserializer matches on the local name with the
    // namespace prefix stripped, so `dc:creator` arrives as `creator`.
    #[serde(rename = "creator")]
    creator: Option<String>,
    #[serde(rename = "category", default)]
    categories: Vec<RssCategory>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "encoded")]
    content_encoded: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RssGuid {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RssCategory {
    #[serde(rename = "$text")]
    value: Option<String>,
}

// ---------- Atom ----------

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<AtomText>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    id: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    author: Option<AtomAuthor>,
    #[serde(rename = "category", default)]
    categories: Vec<AtomCategory>,
    published: Option<String>,
    updated: Option<String>,
    content: Option<AtomText>,
    summary: Option<AtomText>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "@type")]
    kind: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

impl AtomText {
    fn is_html(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|k| k.to_ascii_lowercase().contains("html"))
    }
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomCategory {
    #[serde(rename = "@term")]
    term: Option<String>,
}

// ---------- Parsing ----------

/// Name of the document's root element, used to pick the dialect.
fn root_name(xml: &str) -> Option<String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                return Some(String::from_utf8_lossy(e.name().as_ref()).into_owned())
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Parse a feed document, auto-detecting RSS 2.0 / RDF vs Atom.
pub fn parse_feed(xml: &str) -> Result<ParsedFeed> {
    match root_name(xml).as_deref() {
        Some("rss") | Some("rdf:RDF") | Some("RDF") => {
            let rss: Rss = from_str(xml).context("parsing rss xml")?;
            Ok(from_rss(rss))
        }
        Some(name) if name == "feed" || name.ends_with(":feed") => {
            let atom: AtomFeed = from_str(xml).context("parsing atom xml")?;
            Ok(from_atom(atom))
        }
        Some(other) => bail!("unrecognized feed root element <{other}>"),
        None => bail!("document has no root element"),
    }
}

fn from_rss(rss: Rss) -> ParsedFeed {
    let entries = rss
        .channel
        .items
        .into_iter()
        .map(|it| FeedEntry {
            title: it.title,
            link: it.link,
            guid: it.guid.and_then(|g| g.value).filter(|v| !v.is_empty()),
            author: it.author.or(it.creator),
            tags: it
                .categories
                .into_iter()
                .filter_map(|c| c.value)
                .filter(|t| !t.is_empty())
                .collect(),
            published: it.pub_date,
            // content:encoded is HTML by convention.
            content_html: it.content_encoded.filter(|c| !c.is_empty()),
            summary: it.description,
            // RSS descriptions are HTML-typed by convention, even when the
            // payload happens to be plain text or inline-only markup.
            summary_is_html: true,
        })
        .collect();
    ParsedFeed {
        title: rss.channel.title,
        entries,
    }
}

fn from_atom(feed: AtomFeed) -> ParsedFeed {
    let entries = feed
        .entries
        .into_iter()
        .map(|e| {
            let link = pick_atom_link(&e.links);
            let summary_is_html = e.summary.as_ref().is_some_and(AtomText::is_html);
            let content_html = e
                .content
                .filter(AtomText::is_html)
                .and_then(|c| c.value)
                .filter(|v| !v.is_empty());
            FeedEntry {
                title: e.title.and_then(|t| t.value),
                link,
                guid: e.id.filter(|v| !v.is_empty()),
                author: e.author.and_then(|a| a.name),
                tags: e
                    .categories
                    .into_iter()
                    .filter_map(|c| c.term)
                    .filter(|t| !t.is_empty())
                    .collect(),
                published: e.published.or(e.updated),
                content_html,
                summary: e.summary.and_then(|s| s.value),
                summary_is_html,
            }
        })
        .collect();
    ParsedFeed {
        title: feed.title.and_then(|t| t.value),
        entries,
    }
}

/// Prefer `rel="alternate"` (or no rel) over enclosure/self links.
fn pick_atom_link(links: &[AtomLink]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .and_then(|l| l.href.clone())
}
