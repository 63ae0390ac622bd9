//! Dedup query + paginated page writes against the Notion database.

use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::config::PropertyMap;
use crate::convert::{Block, RichTextSpan};
use crate::ingest::normalize::FeedItem;

use super::{with_backoff, BackoffPolicy, NotionApi, NotionError};

/// Page creation accepts a bounded child payload; the rest is appended.
pub const CREATE_BLOCK_LIMIT: usize = 90;
/// Append batch size.
pub const APPEND_CHUNK_SIZE: usize = 50;
/// Pause between append batches to stay under request-rate ceilings.
const APPEND_PACING: Duration = Duration::from_millis(100);

/// Wraps the raw API with the backoff policy, property mapping, and the
/// create-then-append pagination discipline.
pub struct NotionWriter<A> {
    api: A,
    database_id: String,
    props: PropertyMap,
    backoff: BackoffPolicy,
    chunk_size: usize,
}

impl<A: NotionApi> NotionWriter<A> {
    pub fn new(api: A, database_id: String, props: PropertyMap) -> Self {
        Self {
            api,
            database_id,
            props,
            backoff: BackoffPolicy::default(),
            chunk_size: APPEND_CHUNK_SIZE,
        }
    }

    pub fn with_backoff_policy(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    /// Single remote query: (GUID-property equals guid) OR (URL-property
    /// equals url). True iff at least one page matches. Empty-string
    /// identifiers are treated as absent.
    pub async fn exists_by_guid_or_url(
        &self,
        guid: Option<&str>,
        url: Option<&str>,
    ) -> Result<bool, NotionError> {
        let mut ors = Vec::new();
        if let Some(g) = guid.filter(|g| !g.is_empty()) {
            ors.push(json!({ "property": self.props.guid, "rich_text": { "equals": g } }));
        }
        if let Some(u) = url.filter(|u| !u.is_empty()) {
            ors.push(json!({ "property": self.props.url, "url": { "equals": u } }));
        }
        if ors.is_empty() {
            return Ok(false);
        }
        let filter = json!({ "or": ors });

        let resp = with_backoff(&self.backoff, || {
            self.api.query_database(&self.database_id, &filter, 1)
        })
        .await?;

        Ok(resp
            .get("results")
            .and_then(Value::as_array)
            .is_some_and(|r| !r.is_empty()))
    }

    /// Create the page with at most the first [`CREATE_BLOCK_LIMIT`] blocks,
    /// then append the remainder in chunks. Returns the page id.
    pub async fn write_item(&self, item: &FeedItem, blocks: &[Block]) -> Result<String, NotionError> {
        let split = blocks.len().min(CREATE_BLOCK_LIMIT);
        let page_id = self.create_page(item, &blocks[..split]).await?;
        if split < blocks.len() {
            self.append_blocks(&page_id, &blocks[split..]).await?;
        }
        Ok(page_id)
    }

    pub async fn create_page(
        &self,
        item: &FeedItem,
        first_children: &[Block],
    ) -> Result<String, NotionError> {
        let children: Vec<Value> = first_children.iter().map(block_to_json).collect();
        let payload = json!({
            "parent": { "database_id": self.database_id },
            "properties": self.page_properties(item),
            "children": children,
        });

        let resp = with_backoff(&self.backoff, || self.api.create_page(&payload)).await?;
        resp.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(NotionError::UnexpectedResponse("create page response has no id"))
    }

    pub async fn append_blocks(&self, page_id: &str, blocks: &[Block]) -> Result<(), NotionError> {
        for chunk in blocks.chunks(self.chunk_size) {
            let children = Value::Array(chunk.iter().map(block_to_json).collect());
            with_backoff(&self.backoff, || self.api.append_children(page_id, &children)).await?;
            tokio::time::sleep(APPEND_PACING).await;
        }
        Ok(())
    }

    /// Page properties with the remote schema's truncation limits applied.
    fn page_properties(&self, item: &FeedItem) -> Value {
        let mut props = Map::new();
        props.insert(
            self.props.title.clone(),
            json!({ "title": [{ "text": { "content": clip(&item.title, 2000) } }] }),
        );
        props.insert(self.props.url.clone(), json!({ "url": item.url }));
        props.insert(
            self.props.source.clone(),
            json!({ "select": { "name": clip(&item.source, 100) } }),
        );
        props.insert(
            self.props.author.clone(),
            json!({ "rich_text": [{ "text": { "content": clip(&item.author, 2000) } }] }),
        );
        let guid = item
            .guid
            .as_deref()
            .filter(|g| !g.is_empty())
            .unwrap_or(&item.hash);
        props.insert(
            self.props.guid.clone(),
            json!({ "rich_text": [{ "text": { "content": guid } }] }),
        );
        if let Some(published) = &item.published {
            props.insert(
                self.props.published.clone(),
                json!({ "date": { "start": published } }),
            );
        }
        if !item.tags.is_empty() {
            let tags: Vec<Value> = item
                .tags
                .iter()
                .map(|t| json!({ "name": clip(t, 100) }))
                .collect();
            props.insert(self.props.tags.clone(), json!({ "multi_select": tags }));
        }
        Value::Object(props)
    }
}

/// Character-wise truncation, matching the remote API's limits.
fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn span_to_json(span: &RichTextSpan) -> Value {
    let mut text = Map::new();
    text.insert("content".to_string(), json!(span.text));
    if let Some(link) = &span.link {
        text.insert("link".to_string(), json!({ "url": link }));
    }
    json!({
        "type": "text",
        "text": text,
        "annotations": {
            "bold": span.annotations.bold,
            "italic": span.annotations.italic,
            "strikethrough": span.annotations.strikethrough,
            "underline": span.annotations.underline,
            "code": span.annotations.code,
            "color": span.annotations.color,
        },
    })
}

fn rich_text_json(spans: &[RichTextSpan]) -> Value {
    Value::Array(spans.iter().map(span_to_json).collect())
}

fn keyed_rich_text(key: &str, spans: &[RichTextSpan]) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), json!(key));
    obj.insert(key.to_string(), json!({ "rich_text": rich_text_json(spans) }));
    Value::Object(obj)
}

/// Serialize a block into the remote API's child-block shape.
pub fn block_to_json(block: &Block) -> Value {
    match block {
        Block::Heading { level, rich_text } => {
            let key = match level {
                1 => "heading_1",
                2 => "heading_2",
                _ => "heading_3",
            };
            keyed_rich_text(key, rich_text)
        }
        Block::Paragraph { rich_text } => keyed_rich_text("paragraph", rich_text),
        Block::ListItem { ordered, rich_text } => {
            let key = if *ordered {
                "numbered_list_item"
            } else {
                "bulleted_list_item"
            };
            keyed_rich_text(key, rich_text)
        }
        Block::Quote { rich_text } => keyed_rich_text("quote", rich_text),
        Block::Code { text } => json!({
            "type": "code",
            "code": {
                "rich_text": [span_to_json(&RichTextSpan::plain(text.clone()))],
                "language": "plain text",
            },
        }),
        Block::Image { url } => json!({
            "type": "image",
            "image": { "type": "external", "external": { "url": url } },
        }),
    }
}
