//! Environment-sourced configuration, collected once at startup and passed
//! by reference into the pipeline. No ambient global state.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::convert::MAX_BLOCKS;

/// Notion database property names. Remappable via the `PROPERTY_MAP`
/// environment variable (a JSON object of partial overrides).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMap {
    pub title: String,
    pub url: String,
    pub published: String,
    pub author: String,
    pub tags: String,
    pub source: String,
    pub guid: String,
}

impl Default for PropertyMap {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            url: "URL".to_string(),
            published: "Published".to_string(),
            author: "Author".to_string(),
            tags: "Tags".to_string(),
            source: "Source".to_string(),
            guid: "GUID".to_string(),
        }
    }
}

impl PropertyMap {
    /// Defaults merged with a JSON override map. Malformed JSON is a fatal
    /// configuration error; unknown keys are ignored.
    pub fn with_overrides(raw: &str) -> Result<Self> {
        let overrides: HashMap<String, String> =
            serde_json::from_str(raw).with_context(|| format!("invalid JSON in PROPERTY_MAP: {raw}"))?;
        let mut map = Self::default();
        for (key, value) in overrides {
            match key.as_str() {
                "title" => map.title = value,
                "url" => map.url = value,
                "published" => map.published = value,
                "author" => map.author = value,
                "tags" => map.tags = value,
                "source" => map.source = value,
                "guid" => map.guid = value,
                _ => {}
            }
        }
        Ok(map)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub notion_token: String,
    pub database_id: String,
    /// Comma-separated FEEDS, already split and trimmed.
    pub feeds: Vec<String>,
    pub opml_url: Option<String>,
    pub properties: PropertyMap,
    /// Optional pinned Notion API version.
    pub api_version: Option<String>,
    pub state_path: PathBuf,
    pub max_blocks: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let notion_token = env::var("NOTION_TOKEN").context("NOTION_TOKEN is not set")?;
        let database_id =
            env::var("NOTION_DATABASE_ID").context("NOTION_DATABASE_ID is not set")?;

        let feeds = env::var("FEEDS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let opml_url = env::var("FEEDS_OPML_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let properties = match env::var("PROPERTY_MAP") {
            Ok(raw) => PropertyMap::with_overrides(&raw)?,
            Err(_) => PropertyMap::default(),
        };

        let api_version = env::var("NOTION_VERSION").ok().filter(|s| !s.is_empty());

        let state_path = env::var("STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("state.json"));

        Ok(Self {
            notion_token,
            database_id,
            feeds,
            opml_url,
            properties,
            api_version,
            state_path,
            max_blocks: MAX_BLOCKS,
        })
    }
}
