// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod convert;
pub mod feed;
pub mod fetch;
pub mod ingest;
pub mod notion;

// ---- Re-exports for stable public API ----
pub use crate::config::{Config, PropertyMap};
pub use crate::convert::{html_to_blocks, Annotations, Block, RichTextSpan};
pub use crate::fetch::{Fetcher, HttpFetcher};
pub use crate::ingest::normalize::FeedItem;
pub use crate::notion::{BackoffPolicy, HttpNotionApi, NotionApi, NotionError, NotionWriter};
