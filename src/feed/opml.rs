//! OPML subscription lists: every `outline` carrying an `xmlUrl` contributes
//! one feed URL, in document order.

use anyhow::{Context, Result};
use quick_xml::de::from_str;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Opml {
    body: OpmlBody,
}

#[derive(Debug, Deserialize)]
struct OpmlBody {
    #[serde(rename = "outline", default)]
    outlines: Vec<Outline>,
}

#[derive(Debug, Deserialize)]
struct Outline {
    #[serde(rename = "@xmlUrl")]
    xml_url: Option<String>,
    #[serde(rename = "outline", default)]
    children: Vec<Outline>,
}

pub fn feed_urls(xml: &str) -> Result<Vec<String>> {
    let opml: Opml = from_str(xml).context("parsing opml xml")?;
    let mut urls = Vec::new();
    collect(&opml.body.outlines, &mut urls);
    Ok(urls)
}

fn collect(outlines: &[Outline], urls: &mut Vec<String>) {
    for outline in outlines {
        if let Some(url) = &outline.xml_url {
            if !url.is_empty() {
                urls.push(url.clone());
            }
        }
        collect(&outline.children, urls);
    }
}
