//! Notion API transport: typed errors, a trait seam for tests, and the
//! reqwest-backed implementation.

pub mod backoff;
pub mod writer;

pub use backoff::{with_backoff, BackoffPolicy};
pub use writer::NotionWriter;

use async_trait::async_trait;
use serde_json::Value;

const API_BASE: &str = "https://api.notion.com/v1";
const DEFAULT_API_VERSION: &str = "2022-06-28";

/// Errors surfaced by the remote document API. Only `RateLimited` is
/// retryable; everything else propagates to the per-feed boundary.
#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    #[error("rate limited by the Notion API")]
    RateLimited,
    #[error("Notion API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected Notion response: {0}")]
    UnexpectedResponse(&'static str),
}

/// Raw API operations, one method per endpoint the pipeline touches.
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// `POST /databases/{id}/query`
    async fn query_database(
        &self,
        database_id: &str,
        filter: &Value,
        page_size: u32,
    ) -> Result<Value, NotionError>;

    /// `POST /pages`
    async fn create_page(&self, payload: &Value) -> Result<Value, NotionError>;

    /// `PATCH /blocks/{id}/children`
    async fn append_children(&self, block_id: &str, children: &Value)
        -> Result<Value, NotionError>;
}

pub struct HttpNotionApi {
    client: reqwest::Client,
    token: String,
    version: String,
}

impl HttpNotionApi {
    pub fn new(token: String, version: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            version: version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        }
    }

    async fn call(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &Value,
    ) -> Result<Value, NotionError> {
        let resp = self
            .client
            .request(method, format!("{API_BASE}{path}"))
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(NotionError::RateLimited);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(NotionError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl NotionApi for HttpNotionApi {
    async fn query_database(
        &self,
        database_id: &str,
        filter: &Value,
        page_size: u32,
    ) -> Result<Value, NotionError> {
        let body = serde_json::json!({ "filter": filter, "page_size": page_size });
        self.call(
            reqwest::Method::POST,
            &format!("/databases/{database_id}/query"),
            &body,
        )
        .await
    }

    async fn create_page(&self, payload: &Value) -> Result<Value, NotionError> {
        self.call(reqwest::Method::POST, "/pages", payload).await
    }

    async fn append_children(
        &self,
        block_id: &str,
        children: &Value,
    ) -> Result<Value, NotionError> {
        let body = serde_json::json!({ "children": children });
        self.call(
            reqwest::Method::PATCH,
            &format!("/blocks/{block_id}/children"),
            &body,
        )
        .await
    }
}
