//! Feedclip — binary entrypoint.
//! One pass over all configured feeds, then exit; scheduling is left to
//! cron or whatever invokes the binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedclip::config::Config;
use feedclip::fetch::HttpFetcher;
use feedclip::notion::{HttpNotionApi, NotionWriter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feedclip=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::from_env()?;

    let fetcher = HttpFetcher::new();
    let api = HttpNotionApi::new(cfg.notion_token.clone(), cfg.api_version.clone());
    let writer = NotionWriter::new(api, cfg.database_id.clone(), cfg.properties.clone());

    let outcomes = feedclip::ingest::run(&cfg, &fetcher, &writer).await?;
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    tracing::info!(feeds = outcomes.len(), failed, "run complete");

    Ok(())
}
