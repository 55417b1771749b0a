use anyhow::{Context, Result};
use feed_rs::model::Feed;
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use common::FeedsConfig;

use crate::digest::Digest;

/// Fetches a feed from the given URL and parses it.
/// Enforces a timeout; a non-success status or a parse failure is an error
/// for this feed only.
pub async fn fetch_and_parse_feed(url: &str, timeout_secs: u64) -> Result<Feed> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent("Trendpost/0.1.0")
        .build()
        .context("failed to build reqwest client")?;

    let response = client.get(url).send().await.context("failed to fetch feed")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::anyhow!("feed fetch failed with status: {}", status));
    }

    let bytes = response.bytes().await.context("failed to read response body")?;

    // Parse the feed
    let feed = parser::parse(bytes.as_ref()).context("failed to parse feed")?;

    Ok(feed)
}

/// Walks the configured feeds in order and builds the news digest: up to
/// `entries_per_feed` leading entries per feed, each as a `- [title](link)`
/// bullet, deduplicated by title containment. A failing feed is logged and
/// skipped. Returns the newline-joined digest, empty when nothing was
/// collected.
pub async fn collect_digest(config: &FeedsConfig) -> String {
    let mut digest = Digest::new();

    for url in &config.urls {
        let feed = match fetch_and_parse_feed(url, config.fetch_timeout_seconds).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!("skipping feed {}: {:#}", url, e);
                continue;
            }
        };
        info!("fetched feed '{}': {} entries", url, feed.entries.len());

        for entry in feed.entries.iter().take(config.entries_per_feed) {
            let title = entry
                .title
                .as_ref()
                .map(|t| t.content.clone())
                .unwrap_or_default();
            let link = entry.links.first().map(|l| l.href.clone()).unwrap_or_default();

            if title.is_empty() || link.is_empty() {
                debug!("skipping entry without title or link in {}", url);
                continue;
            }
            if !digest.push(&title, &link) {
                debug!("skipping duplicate title: {}", title);
            }
        }
    }

    digest.into_text()
}
