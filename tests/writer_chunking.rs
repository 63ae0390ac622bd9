// tests/writer_chunking.rs
//
// The create/append pagination discipline, exercised against a recording
// in-memory API.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use feedclip::{Block, FeedItem, NotionApi, NotionError, NotionWriter, PropertyMap, RichTextSpan};

#[derive(Clone, Default)]
struct RecordingApi {
    queries: Arc<Mutex<Vec<Value>>>,
    creates: Arc<Mutex<Vec<Value>>>,
    appends: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl NotionApi for RecordingApi {
    async fn query_database(
        &self,
        _database_id: &str,
        filter: &Value,
        _page_size: u32,
    ) -> Result<Value, NotionError> {
        self.queries.lock().unwrap().push(filter.clone());
        Ok(serde_json::json!({ "results": [] }))
    }

    async fn create_page(&self, payload: &Value) -> Result<Value, NotionError> {
        self.creates.lock().unwrap().push(payload.clone());
        Ok(serde_json::json!({ "id": "page-1" }))
    }

    async fn append_children(
        &self,
        _block_id: &str,
        children: &Value,
    ) -> Result<Value, NotionError> {
        self.appends.lock().unwrap().push(children.clone());
        Ok(serde_json::json!({}))
    }
}

fn item() -> FeedItem {
    FeedItem {
        title: "An article".to_string(),
        url: Some("https://example.com/a".to_string()),
        published: Some("2025-08-04T10:00:00+00:00".to_string()),
        author: "Ada".to_string(),
        tags: vec!["rust".to_string()],
        source: "Example Blog".to_string(),
        guid: Some("guid-a".to_string()),
        hash: "abc123".to_string(),
    }
}

fn paragraphs(n: usize) -> Vec<Block> {
    (0..n)
        .map(|i| Block::paragraph(vec![RichTextSpan::plain(format!("p{i}"))]))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn create_takes_ninety_rest_appends_in_fifties() {
    let api = RecordingApi::default();
    let writer = NotionWriter::new(api.clone(), "db".to_string(), PropertyMap::default());

    writer.write_item(&item(), &paragraphs(140)).await.unwrap();

    let creates = api.creates.lock().unwrap();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0]["children"].as_array().unwrap().len(), 90);

    let appends = api.appends.lock().unwrap();
    assert_eq!(appends.len(), 1);
    assert_eq!(appends[0].as_array().unwrap().len(), 50);
}

#[tokio::test(start_paused = true)]
async fn small_documents_skip_the_append_phase() {
    let api = RecordingApi::default();
    let writer = NotionWriter::new(api.clone(), "db".to_string(), PropertyMap::default());

    writer.write_item(&item(), &paragraphs(3)).await.unwrap();

    assert_eq!(api.creates.lock().unwrap().len(), 1);
    assert!(api.appends.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn long_tail_splits_into_multiple_chunks() {
    let api = RecordingApi::default();
    let writer = NotionWriter::new(api.clone(), "db".to_string(), PropertyMap::default());

    // 90 on create, then 120 to append: 50 + 50 + 20.
    writer.write_item(&item(), &paragraphs(210)).await.unwrap();

    let appends = api.appends.lock().unwrap();
    let sizes: Vec<usize> = appends
        .iter()
        .map(|c| c.as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![50, 50, 20]);
}

#[tokio::test(start_paused = true)]
async fn existence_filter_ors_guid_and_url() {
    let api = RecordingApi::default();
    let writer = NotionWriter::new(api.clone(), "db".to_string(), PropertyMap::default());

    let exists = writer
        .exists_by_guid_or_url(Some("guid-a"), Some("https://example.com/a"))
        .await
        .unwrap();
    assert!(!exists);

    let queries = api.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    let ors = queries[0]["or"].as_array().unwrap();
    assert_eq!(ors.len(), 2);
    assert_eq!(ors[0]["property"], "GUID");
    assert_eq!(ors[0]["rich_text"]["equals"], "guid-a");
    assert_eq!(ors[1]["property"], "URL");
    assert_eq!(ors[1]["url"]["equals"], "https://example.com/a");
}

#[tokio::test(start_paused = true)]
async fn existence_check_without_identifiers_skips_the_query() {
    let api = RecordingApi::default();
    let writer = NotionWriter::new(api.clone(), "db".to_string(), PropertyMap::default());

    let exists = writer.exists_by_guid_or_url(None, None).await.unwrap();
    assert!(!exists);
    assert!(api.queries.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_string_identifiers_are_treated_as_absent() {
    let api = RecordingApi::default();
    let writer = NotionWriter::new(api.clone(), "db".to_string(), PropertyMap::default());

    let exists = writer.exists_by_guid_or_url(Some(""), Some("")).await.unwrap();
    assert!(!exists);
    assert!(api.queries.lock().unwrap().is_empty());

    writer
        .exists_by_guid_or_url(Some(""), Some("https://example.com/a"))
        .await
        .unwrap();
    let queries = api.queries.lock().unwrap();
    let ors = queries[0]["or"].as_array().unwrap();
    assert_eq!(ors.len(), 1);
    assert_eq!(ors[0]["property"], "URL");
}

#[tokio::test(start_paused = true)]
async fn empty_guid_property_falls_back_to_hash() {
    let api = RecordingApi::default();
    let writer = NotionWriter::new(api.clone(), "db".to_string(), PropertyMap::default());

    let mut it = item();
    it.guid = Some(String::new());
    writer.write_item(&it, &paragraphs(1)).await.unwrap();

    let creates = api.creates.lock().unwrap();
    assert_eq!(
        creates[0]["properties"]["GUID"]["rich_text"][0]["text"]["content"],
        "abc123"
    );
}

#[tokio::test(start_paused = true)]
async fn page_properties_respect_remap_and_truncation() {
    let api = RecordingApi::default();
    let props = PropertyMap::with_overrides(r#"{"title": "Name"}"#).unwrap();
    let writer = NotionWriter::new(api.clone(), "db".to_string(), props);

    let mut it = item();
    it.title = "t".repeat(3000);
    writer.write_item(&it, &paragraphs(1)).await.unwrap();

    let creates = api.creates.lock().unwrap();
    let properties = &creates[0]["properties"];
    let title = properties["Name"]["title"][0]["text"]["content"]
        .as_str()
        .unwrap();
    assert_eq!(title.chars().count(), 2000);
    assert_eq!(properties["GUID"]["rich_text"][0]["text"]["content"], "guid-a");
    assert_eq!(properties["Published"]["date"]["start"], "2025-08-04T10:00:00+00:00");
    assert_eq!(properties["Tags"]["multi_select"][0]["name"], "rust");
}
