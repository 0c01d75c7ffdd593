// src/ingest/providers/rss.rs
//! Headlines from an RSS 2.0 document (local file or in-memory fixture).
//! Every `<item>` becomes one [`RawItem`] tagged with the configured platform,
//! language and optional region.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::ingest::types::{RawItem, SourceProvider};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    guid: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// RFC 2822 `pubDate` → RFC 3339, keeping the feed's own offset.
fn rfc2822_to_rfc3339(ts: &str) -> Option<String> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

enum Mode {
    Fixture(String),
    File(PathBuf),
}

pub struct RssFeedProvider {
    mode: Mode,
    platform: String,
    language: String,
    region: Option<String>,
}

impl RssFeedProvider {
    pub fn from_fixture_str(s: &str, platform: &str, language: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            platform: platform.to_string(),
            language: language.to_string(),
            region: None,
        }
    }

    pub fn from_path(path: impl Into<PathBuf>, platform: &str, language: &str) -> Self {
        Self {
            mode: Mode::File(path.into()),
            platform: platform.to_string(),
            language: language.to_string(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<RawItem>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let fetched_at = chrono::Utc::now().to_rfc3339();
        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = it.title.as_deref().unwrap_or_default().trim();
            let desc = it.description.as_deref().unwrap_or_default().trim();
            let text_raw = match (title.is_empty(), desc.is_empty()) {
                (false, false) => format!("{title}. {desc}"),
                (false, true) => title.to_string(),
                (true, _) => desc.to_string(),
            };
            let text = crate::ingest::normalize_text(&text_raw);
            if text.is_empty() {
                continue;
            }

            // Only a missing date falls back to the fetch time. An unparseable one
            // is kept as written so aggregation rejects it under the item's guid.
            let timestamp = match it.pub_date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
                None => {
                    tracing::debug!(target: "ingest", "missing pubDate, using fetch time");
                    fetched_at.clone()
                }
                Some(raw) => rfc2822_to_rfc3339(raw).unwrap_or_else(|| raw.to_string()),
            };

            out.push(RawItem {
                id: it.guid.filter(|g| !g.trim().is_empty()),
                text,
                platform: self.platform.clone(),
                timestamp,
                language: self.language.clone(),
                region: self.region.clone(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RssFeedProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::File(path) => {
                let body = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading rss feed {}", path.display()))?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
